use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::extractor::TagExtractor;

/// Registry configuration, parsed from TOML.
///
/// ```toml
/// ignore_unsettable = false
///
/// [extractor]
/// tag = "default"
/// prefix = ""
/// separator = ","
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultzConfig {
    /// Skip fields that cannot be written instead of failing.
    #[serde(default)]
    pub ignore_unsettable: bool,

    /// How default specs are read from field tags.
    #[serde(default)]
    pub extractor: TagExtractor,
}

impl DefaultzConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.extractor.tag.is_empty() {
            return Err(ConfigError::Invalid("extractor.tag must not be empty".into()));
        }
        if self.extractor.separator.is_empty() {
            return Err(ConfigError::Invalid("extractor.separator must not be empty".into()));
        }
        Ok(())
    }
}
