use crate::fragment::MarkupFragment;
use crate::policy::{CDataPolicy, EncodeEachSymbol, EscapeSet, TextEncodingPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeMode {
    /// One character reference per escaped character
    #[default]
    Entities,
    /// CDATA sections around payloads that need escaping
    Cdata,
}

/// Encoder configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncodeOptions {
    pub mode: EncodeMode,

    /// Escape every character outside ASCII
    pub escape_non_ascii: bool,

    /// Characters escaped in addition to `<`, `>`, `&` and U+00A0
    pub extra_escapes: Vec<char>,
}

impl EncodeOptions {
    /// Preset for 7-bit clean output
    pub fn ascii_only() -> Self {
        Self {
            escape_non_ascii: true,
            ..Default::default()
        }
    }

    /// Preset for attribute-safe text (quotes escaped too)
    pub fn attribute_value() -> Self {
        Self {
            extra_escapes: vec!['"', '\''],
            ..Default::default()
        }
    }

    pub fn policy(&self) -> Box<dyn TextEncodingPolicy + Send + Sync> {
        let escapes = EscapeSet::from_options(self);
        match self.mode {
            EncodeMode::Entities => Box::new(EncodeEachSymbol::new(escapes)),
            EncodeMode::Cdata => Box::new(CDataPolicy::new(escapes)),
        }
    }

    pub fn encode(&self, text: &str) -> MarkupFragment {
        tracing::debug!(mode = ?self.mode, len = text.len(), "encoding text payload");
        self.policy().encode(text)
    }
}
