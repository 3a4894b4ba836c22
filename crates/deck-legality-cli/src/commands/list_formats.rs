//! List formats command implementation.

use deck_legality_core::{BoundField, Config, FormatRuleSet};
use std::fmt::Write as _;

/// Runs the list-formats command.
pub fn run(config: &Config) {
    print!("{}", render(config));
}

fn render(config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Configured formats:\n");
    let _ = writeln!(
        out,
        "{:<12} {:<24} {:<9} {:<6} {:<5} {:<7} {:<7} {:<5} Bans",
        "Name", "Title", "Factions", "Cards", "Rare", "Unique", "Copies", "Hero"
    );
    let _ = writeln!(out, "{}", "-".repeat(90));

    for rules in &config.formats {
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<9} {:<6} {:<5} {:<7} {:<7} {:<5} {}",
            rules.name().as_str(),
            rules.title(),
            factions(rules),
            cards(rules),
            bound(rules, BoundField::MaxRareCount),
            bound(rules, BoundField::MaxUniqueCount),
            bound(rules, BoundField::MaxSameFamilyCount),
            if rules.hero_mandatory() { "yes" } else { "no" },
            rules.banned().len()
        );
    }

    let _ = writeln!(out, "\nA deck is checked against every format, in this order.");
    out
}

fn bound(rules: &FormatRuleSet, field: BoundField) -> String {
    rules
        .bound(field)
        .map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn factions(rules: &FormatRuleSet) -> String {
    format!(
        "{}-{}",
        bound(rules, BoundField::MinFactionCount),
        bound(rules, BoundField::MaxFactionCount)
    )
}

fn cards(rules: &FormatRuleSet) -> String {
    let min = bound(rules, BoundField::MinTotalCount);
    if rules.count_hero_in_total() {
        format!("{min}+H")
    } else {
        min
    }
}
