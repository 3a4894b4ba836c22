//! Banned command implementation.

use anyhow::{bail, Result};
use deck_legality_core::card_status::banned_cards;
use deck_legality_core::{CardCatalog, Config, FormatRuleSet};
use std::fmt::Write as _;
use std::path::Path;

use super::{diagnostic, load_catalog};

/// Runs the banned command.
pub fn run(catalog: &Path, format_name: Option<&str>, config: &Config) -> Result<()> {
    let formats = select(config, format_name)?;
    let catalog = load_catalog(catalog, config)?;
    print!("{}", render(&catalog, &formats)?);
    Ok(())
}

fn select<'a>(config: &'a Config, format_name: Option<&str>) -> Result<Vec<&'a FormatRuleSet>> {
    let Some(name) = format_name else {
        return Ok(config.formats.iter().collect());
    };
    match config.formats.get(name) {
        Some(rules) => Ok(vec![rules]),
        None => {
            let available: Vec<&str> = config.formats.iter().map(|f| f.name().as_str()).collect();
            bail!(
                "Unknown format `{name}`. Available formats: {}",
                available.join(", ")
            )
        }
    }
}

fn render(catalog: &CardCatalog, formats: &[&FormatRuleSet]) -> Result<String> {
    let mut out = String::new();
    for rules in formats {
        let cards = banned_cards(catalog, rules)
            .map_err(|e| diagnostic(e, "Malformed card in catalog".to_string()))?;

        let _ = writeln!(out, "{} ({} banned)", rules.title(), cards.len());
        for card in cards {
            let _ = writeln!(out, "  {:<24} {card}", card.reference);
        }
        let _ = writeln!(out);
    }
    Ok(out)
}
