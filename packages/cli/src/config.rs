use psikit_classes::LanguageLevel;
use psikit_markup::EncodeOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "psikit.config.json";

/// psikit configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Language level for class queries
    #[serde(default)]
    pub language_level: LanguageLevel,

    /// Defaults for `psikit encode`
    #[serde(default)]
    pub encode: EncodeOptions,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psikit_markup::EncodeMode;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "languageLevel": "python2",
            "encode": { "mode": "cdata", "escapeNonAscii": true, "extraEscapes": ["\""] }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.language_level, LanguageLevel::Python2);
        assert_eq!(config.encode.mode, EncodeMode::Cdata);
        assert!(config.encode.escape_non_ascii);
        assert_eq!(config.encode.extra_escapes, vec!['"']);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.language_level, LanguageLevel::Python3);
        assert_eq!(config.encode.mode, EncodeMode::Entities);
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let config = Config::load("/nonexistent/psikit").unwrap();
        assert_eq!(config, Config::default());
    }
}
