use psikit_parser::ParseError;
use thiserror::Error;

/// Error type shared by the psikit crates
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl CommonError {
    pub fn parse(path: impl Into<String>, source: ParseError) -> Self {
        CommonError::Parse {
            path: path.into(),
            source,
        }
    }
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}
