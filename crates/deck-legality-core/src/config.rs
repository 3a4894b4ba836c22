//! Configuration file (`deck-legality.toml`).
//!
//! ```toml
//! [batch]
//! chunk_size = 1000
//! only_illegal = false
//! illegal_format = "standard"
//!
//! [messages]
//! ERR_MISSING_HERO = "Héros manquant"
//!
//! [[formats]]
//! name = "standard"
//! # ...
//! ```

use crate::code::{MessageCatalog, UnknownCodeError};
use crate::formats::{builtin_table, load_formats_from_toml, FormatTable, LoadFormatsError};
use crate::legality::BatchOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fully loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Batch recalculation settings.
    pub batch: BatchConfig,
    /// Message templates, English unless translated.
    pub messages: MessageCatalog,
    /// Validated format table.
    pub formats: FormatTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            messages: MessageCatalog::english(),
            formats: builtin_table(),
        }
    }
}

/// Sections read directly by serde; `[[formats]]` goes through the
/// formats loader.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    batch: BatchConfig,
    #[serde(default)]
    messages: HashMap<String, String>,
}

impl Config {
    /// Creates the built-in configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, a message key is not a
    /// violation code, or the format table fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        let messages = MessageCatalog::from_table(&raw.messages)?;
        let formats = load_formats_from_toml(content)?;
        Ok(Self {
            batch: raw.batch,
            messages,
            formats,
        })
    }
}

/// `[batch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Decks handed to the writer at once.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Only recalculate decks not stored as legal in `illegal_format`.
    #[serde(default)]
    pub only_illegal: bool,

    /// Format consulted by `only_illegal`.
    #[serde(default = "default_illegal_format")]
    pub illegal_format: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            only_illegal: false,
            illegal_format: default_illegal_format(),
        }
    }
}

impl BatchConfig {
    /// Converts to updater options.
    #[must_use]
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            chunk_size: self.chunk_size,
            only_illegal_in: self.only_illegal.then(|| self.illegal_format.clone()),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_illegal_format() -> String {
    "standard".to_string()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A `[messages]` key is not a violation code.
    #[error("Invalid [messages] section: {0}")]
    Messages(#[from] UnknownCodeError),

    /// The `[[formats]]` table is invalid.
    #[error("Invalid [[formats]] table: {0}")]
    Formats(#[from] LoadFormatsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ViolationCode;
    use crate::formats::builtin::DEFAULT_FORMATS_TOML;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.batch.chunk_size, 1000);
        assert!(!config.batch.only_illegal);
        assert_eq!(config.formats, builtin_table());
        assert_eq!(config.batch.options().only_illegal_in, None);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[batch]
chunk_size = 50
only_illegal = true

[messages]
ERR_MISSING_HERO = "Héros manquant"

[[formats]]
name = "casual"
max_faction_count = 2
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(
            config.batch.options(),
            BatchOptions {
                chunk_size: 50,
                only_illegal_in: Some("standard".to_string()),
            }
        );
        assert_eq!(config.messages.template(ViolationCode::MissingHero), "Héros manquant");
        assert_eq!(config.formats.len(), 1);
    }

    #[test]
    fn test_empty_config_is_builtin() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.formats, builtin_table());
        assert_eq!(config.batch, BatchConfig::default());
    }

    #[test]
    fn test_default_formats_section_parses() {
        let config = Config::parse(DEFAULT_FORMATS_TOML).unwrap();
        assert_eq!(config.formats, builtin_table());
    }

    #[test]
    fn test_unknown_message_code_is_rejected() {
        let err = Config::parse("[messages]\nERR_TOO_SPICY = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Messages(_)));
    }

    #[test]
    fn test_invalid_formats_are_rejected() {
        let err = Config::parse("[[formats]]\nname = \"b\"\nextends = \"a\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Formats(_)));
    }

    #[test]
    fn test_unknown_batch_key_is_rejected() {
        let err = Config::parse("[batch]\nchunk = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/deck-legality.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
