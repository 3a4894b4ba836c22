//! Competitive formats driven by TOML configuration.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! FormatTable (pure domain model)
//! ```
//!
//! When the configuration defines no `[[formats]]`, the built-in table is
//! used.

pub mod builtin;
pub mod config_dto;
pub mod loader;
pub mod model;

pub use builtin::builtin_table;
pub use model::{BannedCard, BoundField, FormatName, FormatRuleSet, FormatTable, ModelError};

/// Errors from parsing TOML and loading the format table.
#[derive(Debug, thiserror::Error)]
pub enum LoadFormatsError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),
}

/// Parses TOML content and builds the format table.
///
/// Returns the built-in table if no `[[formats]]` are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or model validation fails.
pub fn load_formats_from_toml(content: &str) -> Result<FormatTable, LoadFormatsError> {
    let dto: config_dto::FormatsConfigDto = toml::from_str(content)?;
    if dto.formats.is_empty() {
        tracing::debug!("No [[formats]] configured, using built-in table");
        return Ok(builtin_table());
    }
    Ok(loader::load(dto)?)
}
