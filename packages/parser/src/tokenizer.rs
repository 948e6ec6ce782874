//! Python tokenizer built on logos.
//!
//! Logos handles the flat token stream; indentation is layered on top by
//! [`tokenize`], which turns leading whitespace into `Indent`/`Dedent`
//! tokens and drops newlines that appear inside brackets or on blank lines.

use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};
use std::ops::Range;

/// Token types for the Python class-outline grammar
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\x0C]+")]
#[logos(skip r"#[^\r\n]*")]
#[logos(skip r"\\\r?\n")]
pub enum Token<'src> {
    // Keywords that shape the outline
    #[token("class")]
    Class,

    #[token("def")]
    Def,

    #[token("async")]
    Async,

    #[token("pass")]
    Pass,

    #[token("lambda")]
    Lambda,

    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*", |lex| lex.slice())]
    Ident(&'src str),

    // String literals, raw slice including prefix and quotes
    #[regex(r#"[rRbBuUfF]{0,2}""""#, |lex| lex_triple_quoted(lex, "\"\"\""))]
    #[regex(r"[rRbBuUfF]{0,2}'''", |lex| lex_triple_quoted(lex, "'''"))]
    #[regex(r#"[rRbBuUfF]{0,2}"([^"\\\r\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"[rRbBuUfF]{0,2}'([^'\\\r\n]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?[jJ]?", |lex| lex.slice())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[jJ]?", |lex| lex.slice())]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+", |lex| lex.slice())]
    Number(&'src str),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,

    #[regex(r"(\+|-|\*|/|//|%|@|&|\||\^|>>|<<|\*\*)=", |lex| lex.slice())]
    AugAssign(&'src str),

    #[regex(r"\*\*|//|<<|>>|<=|>=|==|!=|:=|[-+*/%&|^~<>]", |lex| lex.slice())]
    Op(&'src str),

    #[regex(r"\r?\n")]
    Newline,

    // Synthesized by `tokenize`, never produced by logos directly
    Indent,
    Dedent,
}

/// Scan to the closing triple quote, honouring backslash escapes
fn lex_triple_quoted<'src>(lex: &mut Lexer<'src, Token<'src>>, quote: &str) -> Option<&'src str> {
    let rest = lex.remainder().as_bytes();
    let quote = quote.as_bytes();
    let mut offset = 0;

    while offset < rest.len() {
        if rest[offset] == b'\\' {
            offset += 2;
            continue;
        }
        if rest[offset..].starts_with(quote) {
            lex.bump(offset + quote.len());
            return Some(lex.slice());
        }
        offset += 1;
    }

    None
}

/// Display column of the token starting at `offset`; tabs advance to the next multiple of 8
fn indentation_of(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..offset].chars().fold(0, |column, ch| match ch {
        '\t' => (column / 8 + 1) * 8,
        _ => column + 1,
    })
}

fn starts_logical_line(tokens: &[(Token<'_>, Range<usize>)]) -> bool {
    matches!(tokens.last(), None | Some((Token::Newline, _)))
}

/// Tokenize Python source into a stream with explicit `Newline`, `Indent`
/// and `Dedent` tokens.
///
/// The indentation of the first logical line is taken as the margin, so
/// uniformly indented snippets (e.g. raw string literals in tests) lex the
/// same as flush-left files.
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens: Vec<(Token<'_>, Range<usize>)> = Vec::new();
    let mut indents: Vec<usize> = Vec::new();
    let mut bracket_depth = 0usize;

    for (result, span) in Token::lexer(source).spanned() {
        let token = result.map_err(|_| ParseError::lexer_error(span.clone()))?;

        if token == Token::Newline {
            // Implicit line joining inside brackets, and blank or comment-only lines
            if bracket_depth == 0 && !starts_logical_line(&tokens) {
                tokens.push((Token::Newline, span));
            }
            continue;
        }

        if starts_logical_line(&tokens) {
            let column = indentation_of(source, span.start);
            match indents.last().copied() {
                None => indents.push(column),
                Some(current) if column > current => {
                    indents.push(column);
                    tokens.push((Token::Indent, span.start..span.start));
                }
                Some(current) if column < current => {
                    while indents.last().is_some_and(|&top| top > column) {
                        indents.pop();
                        tokens.push((Token::Dedent, span.start..span.start));
                    }
                    if indents.last() != Some(&column) {
                        return Err(ParseError::invalid_syntax(
                            span,
                            "unindent does not match any outer indentation level",
                        ));
                    }
                }
                Some(_) => {}
            }
        }

        match token {
            Token::LParen | Token::LBracket | Token::LBrace => bracket_depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace => {
                bracket_depth = bracket_depth.saturating_sub(1)
            }
            _ => {}
        }

        tokens.push((token, span));
    }

    let end = source.len();
    if !starts_logical_line(&tokens) {
        tokens.push((Token::Newline, end..end));
    }
    while indents.len() > 1 {
        indents.pop();
        tokens.push((Token::Dedent, end..end));
    }

    Ok(tokens)
}
