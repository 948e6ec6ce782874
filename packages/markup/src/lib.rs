//! Text-to-markup encoding.
//!
//! A text payload becomes an ordered run of [`MarkupNode`]s: plain text
//! runs, one character reference per character the [`EscapePolicy`] flags,
//! or CDATA sections under [`CDataPolicy`]. Decoding the nodes always gives
//! back the original payload.

pub mod char_table;
pub mod decoder;
pub mod encoder;
pub mod entities;
pub mod error;
pub mod fragment;
pub mod node;
pub mod options;
pub mod policy;


pub use char_table::CharTable;
pub use decoder::{decode_char_ref, decode_markup, decode_nodes};
pub use encoder::{encode, encode_cdata, encode_entities};
pub use error::{MarkupError, MarkupResult};
pub use fragment::MarkupFragment;
pub use node::MarkupNode;
pub use options::{EncodeMode, EncodeOptions};
pub use policy::{
    CDataPolicy, DefaultEscapes, EncodeEachSymbol, EscapePolicy, EscapeSet, TextEncodingPolicy,
};
