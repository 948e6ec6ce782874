//! Class-outline parser for Python sources.
//!
//! Produces a [`Module`](ast::Module) holding the classes and functions of a
//! file, with the pieces class analysis needs: bases and header keywords,
//! decorators, docstrings, class-level bindings and the attributes methods
//! assign on their receiver. Statements outside that outline are skipped.

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod tokenizer;

#[cfg(test)]
mod tests;

pub use error::{ParseError, ParseResult};
pub use id_generator::IDGenerator;
pub use parser::{parse, parse_with_path, Parser};
pub use tokenizer::{tokenize, Token};
