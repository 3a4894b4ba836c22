//! Check command implementation.

use anyhow::{Context, Result};
use deck_legality_core::{Config, DeckList, LegalityUpdater};
use std::path::Path;

use super::{diagnostic, load_catalog, output};
use crate::OutputFormat;

/// Runs the check command.
///
/// An illegal deck is ordinary output; only unreadable input fails.
pub fn run(decklist: &Path, catalog: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let catalog = load_catalog(catalog, config)?;
    let text = std::fs::read_to_string(decklist)
        .with_context(|| format!("Failed to read decklist: {}", decklist.display()))?;

    let deck = DeckList::parse_decklist(&text, &catalog).map_err(|e| {
        diagnostic(e, format!("Invalid decklist: {}", decklist.display()))
    })?;

    tracing::info!(
        "Checking {} card(s) against {} format(s)",
        deck.card_count(),
        config.formats.len()
    );

    let updater = LegalityUpdater::new(&config.formats, &catalog);
    let verdicts = updater
        .evaluate(&deck)
        .map_err(|e| diagnostic(e, format!("Cannot evaluate {}", decklist.display())))?;

    output::print(&verdicts, config, format)
}
