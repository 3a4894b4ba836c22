//! Subcommand implementations.

pub mod banned;
pub mod check;
pub mod init;
pub mod list_formats;
pub mod output;
pub mod recalc;

use anyhow::{Context, Result};
use deck_legality_core::{CardCatalog, Config};
use std::path::Path;

/// Loads the card catalog and warns about ban entries it cannot match.
fn load_catalog(path: &Path, config: &Config) -> Result<CardCatalog> {
    let catalog = CardCatalog::from_file(path)
        .with_context(|| format!("Failed to load card catalog: {}", path.display()))?;
    for (format, ban) in config.formats.unmatched_bans(&catalog) {
        tracing::warn!("Format `{format}` bans {ban}, which matches no card in the catalog");
    }
    Ok(catalog)
}

/// Prints a diagnostic and turns it into an error for the caller.
fn diagnostic<E>(error: E, context: String) -> anyhow::Error
where
    E: miette::Diagnostic + Send + Sync + 'static,
{
    eprintln!("{:?}", miette::Report::new(error));
    anyhow::anyhow!(context)
}
