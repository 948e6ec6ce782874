use std::ops::Range;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {span:?}: expected {expected}, found {found}")]
    UnexpectedToken {
        span: Range<usize>,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file at {pos}: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Invalid syntax at {span:?}: {message}")]
    InvalidSyntax { span: Range<usize>, message: String },

    #[error("Lexer error at {span:?}")]
    LexerError { span: Range<usize> },
}

impl ParseError {
    pub fn unexpected_token(
        span: Range<usize>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            message: message.into(),
        }
    }

    pub fn lexer_error(span: Range<usize>) -> Self {
        Self::LexerError { span }
    }

    /// Byte range the error points at
    pub fn span(&self) -> Range<usize> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::LexerError { span } => span.clone(),
            ParseError::UnexpectedEof { pos, .. } => *pos..*pos,
        }
    }

    fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnexpectedEof { expected, .. } => format!("expected {}", expected),
            ParseError::InvalidSyntax { message, .. } => message.clone(),
            ParseError::LexerError { .. } => "unrecognized character".to_string(),
        }
    }

    /// Render the error against its source with ariadne
    #[cfg(feature = "pretty-errors")]
    pub fn report(&self, source: &str, filename: &str) -> String {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let span = self.span();
        let mut output = Vec::new();

        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_color(Color::Red)
                    .with_message(self.label()),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output);

        match written {
            Ok(()) => String::from_utf8_lossy(&output).into_owned(),
            Err(_) => format!("{}: {}", filename, self),
        }
    }

    #[cfg(not(feature = "pretty-errors"))]
    pub fn report(&self, _source: &str, filename: &str) -> String {
        format!("{}: {} ({})", filename, self, self.label())
    }
}
