use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    Python2,
    #[default]
    Python3,
}

/// Configuration for ancestry and type queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeEvalContext {
    pub language_level: LanguageLevel,

    /// Longest inheritance chain followed before giving up
    pub max_depth: usize,
}

impl Default for TypeEvalContext {
    fn default() -> Self {
        Self::python3()
    }
}

impl TypeEvalContext {
    pub fn python3() -> Self {
        Self {
            language_level: LanguageLevel::Python3,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn python2() -> Self {
        Self {
            language_level: LanguageLevel::Python2,
            ..Self::python3()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_python2(&self) -> bool {
        self.language_level == LanguageLevel::Python2
    }
}
