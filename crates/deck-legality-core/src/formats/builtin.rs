//! Built-in competitive formats.
//!
//! Used whenever the configuration defines no `[[formats]]`.

use crate::card::{CardFamily, Faction};

use super::model::{BannedCard, FormatName, FormatRuleSet, FormatTable};

/// The built-in table written by `deck-legality init`.
///
/// Must describe exactly the same formats as [`builtin_table`].
pub const DEFAULT_FORMATS_TOML: &str = r#"# Competitive formats, evaluated in this order.
# A format may `extends` any format defined above it and override
# its fields; `unset` clears an inherited bound, `unban` lifts an
# inherited ban.

[[formats]]
name = "standard"
title = "Standard"
max_faction_count = 1
min_total_count = 39
max_rare_count = 15
max_unique_count = 3
max_same_family_count = 3
enforce_individual_uniques = true
hero_mandatory = true
banned = [
    { family = "YZ_05_U", faction = "AX" },
    { family = "YZ_05_U", faction = "YZ" },
    { family = "AX_16_U", faction = "BR" },
]

[[formats]]
name = "draft"
title = "Draft"
max_faction_count = 3
min_total_count = 30
count_hero_in_total = true
enforce_individual_uniques = true

[[formats]]
name = "exalts"
title = "Exalts Championship"
extends = "standard"
max_rare_count = 18
max_unique_count = 0

[[formats]]
name = "doubles"
title = "Doubles"
extends = "standard"
min_faction_count = 2
max_faction_count = 2
"#;

fn format_name(name: &'static str) -> FormatName {
    FormatName::from_static(name)
}

fn ban(family: &'static str, faction: Faction) -> BannedCard {
    BannedCard::new(CardFamily::from_static(family), faction)
}

/// Standard: mono-faction constructed.
#[must_use]
pub fn standard() -> FormatRuleSet {
    FormatRuleSet::new(format_name("standard"), "Standard")
        .with_max_faction_count(1)
        .with_min_total_count(39)
        .with_max_rare_count(15)
        .with_max_unique_count(3)
        .with_max_same_family_count(3)
        .with_individual_uniques(true)
        .with_hero_mandatory(true)
        .with_ban(ban("YZ_05_U", Faction::Axiom))
        .with_ban(ban("YZ_05_U", Faction::Yzmir))
        .with_ban(ban("AX_16_U", Faction::Bravos))
}

/// Draft: up to three factions, the hero counts toward the card minimum.
#[must_use]
pub fn draft() -> FormatRuleSet {
    FormatRuleSet::new(format_name("draft"), "Draft")
        .with_max_faction_count(3)
        .with_min_total_count(30)
        .with_hero_in_total(true)
        .with_individual_uniques(true)
}

/// Exalts Championship: Standard with more rares and no uniques.
#[must_use]
pub fn exalts() -> FormatRuleSet {
    standard()
        .derive(format_name("exalts"), "Exalts Championship")
        .with_max_rare_count(18)
        .with_max_unique_count(0)
}

/// Doubles: Standard with exactly two factions.
#[must_use]
pub fn doubles() -> FormatRuleSet {
    standard()
        .derive(format_name("doubles"), "Doubles")
        .with_min_faction_count(2)
        .with_max_faction_count(2)
}

/// Returns the built-in table: standard, draft, exalts, doubles.
#[must_use]
pub fn builtin_table() -> FormatTable {
    FormatTable::from_validated(formats())
}

fn formats() -> Vec<FormatRuleSet> {
    vec![standard(), draft(), exalts(), doubles()]
}
