use thiserror::Error;

pub type MarkupResult<T> = Result<T, MarkupError>;

/// Errors decoding serialized markup; encoding never fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unknown character reference {reference} at {offset}")]
    UnknownReference { reference: String, offset: usize },

    #[error("Unterminated CDATA section at {offset}")]
    UnterminatedCData { offset: usize },

    #[error("Unescaped {ch:?} at {offset}")]
    UnescapedChar { ch: char, offset: usize },
}

impl MarkupError {
    pub fn unknown_reference(reference: impl Into<String>, offset: usize) -> Self {
        Self::UnknownReference {
            reference: reference.into(),
            offset,
        }
    }
}
