//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/deck-legality.toml` or `.deck-legality.toml`
//! 3. `$DECK_LEGALITY_CONFIG_DIR/config.toml` or
//!    `~/.deck-legality/config.toml` (global fallback)
//! 4. No config found → built-in formats and English messages

use anyhow::{Context, Result};
use deck_legality_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["deck-legality.toml", ".deck-legality.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Loads the configuration a source points to.
///
/// [`ConfigSource::Default`] yields the built-in configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn load(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        tracing::debug!("No configuration file found, using built-in formats");
        return Ok(Config::default());
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    tracing::debug!(
        "Loaded {} format(s) from {}",
        config.formats.len(),
        path.display()
    );
    Ok(config)
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory path.
///
/// Resolution: `$DECK_LEGALITY_CONFIG_DIR` > `~/.deck-legality/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DECK_LEGALITY_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".deck-legality"))
}
