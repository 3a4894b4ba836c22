//! Init command implementation.

use anyhow::{bail, Context, Result};
use deck_legality_core::formats::builtin::DEFAULT_FORMATS_TOML;
use std::path::{Path, PathBuf};

const CONFIG_NAME: &str = "deck-legality.toml";

const HEADER: &str = r#"# deck-legality configuration

[batch]
# Decks written at once by `deck-legality recalc`
chunk_size = 1000

# Only recalculate decks not stored as legal in `illegal_format`
only_illegal = false
illegal_format = "standard"

# Message overrides, keyed by violation code. `{count}` is replaced
# by the bound the deck failed.
[messages]
# ERR_NOT_ENOUGH_CARD_COUNT = "Needs at least {count} cards"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to adjust the formats");
    println!("  2. Run: deck-legality check --catalog cards.json deck.txt");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_NAME);

    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let content = format!("{HEADER}\n{DEFAULT_FORMATS_TOML}");
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote default configuration to {}", path.display());
    Ok(path)
}
