//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;

/// Raw TOML representation of the format table.
///
/// Only the `[[formats]]` array is read; other sections of the
/// configuration file are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatsConfigDto {
    /// Format definitions, in table order.
    #[serde(default)]
    pub formats: Vec<FormatDto>,
}

/// TOML representation of one format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatDto {
    /// Format name (e.g., "standard").
    pub name: String,
    /// Display title (defaults to the name).
    #[serde(default)]
    pub title: Option<String>,
    /// Name of an earlier format to copy constraints from.
    #[serde(default)]
    pub extends: Option<String>,

    /// Inclusive lower bound on factions.
    pub min_faction_count: Option<u32>,
    /// Inclusive upper bound on factions.
    pub max_faction_count: Option<u32>,
    /// Inclusive lower bound on cards.
    pub min_total_count: Option<u32>,
    /// Inclusive upper bound on rare cards.
    pub max_rare_count: Option<u32>,
    /// Inclusive upper bound on unique cards.
    pub max_unique_count: Option<u32>,
    /// Inclusive upper bound on copies of one family.
    pub max_same_family_count: Option<u32>,

    /// Whether a repeated unique is a violation.
    pub enforce_individual_uniques: Option<bool>,
    /// Whether a hero is required.
    pub hero_mandatory: Option<bool>,
    /// Whether the hero counts toward `min_total_count`.
    pub count_hero_in_total: Option<bool>,

    /// Inherited bounds to clear (by key, e.g. "max_rare_count").
    #[serde(default)]
    pub unset: Vec<String>,
    /// Ban entries to add.
    #[serde(default)]
    pub banned: Vec<BannedCardDto>,
    /// Inherited ban entries to lift.
    #[serde(default)]
    pub unban: Vec<BannedCardDto>,
}

/// TOML representation of a ban entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BannedCardDto {
    /// Card family (e.g., "YZ_05_U").
    pub family: String,
    /// Faction code the ban applies to (e.g., "AX").
    pub faction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: FormatsConfigDto = toml::from_str("").unwrap();
        assert!(dto.formats.is_empty());
    }

    #[test]
    fn deserialize_ignores_other_sections() {
        let toml_str = r#"
[batch]
chunk_size = 10

[messages]
ERR_MISSING_HERO = "Sans héros"
"#;
        let dto: FormatsConfigDto = toml::from_str(toml_str).unwrap();
        assert!(dto.formats.is_empty());
    }

    #[test]
    fn deserialize_full_format() {
        let toml_str = r#"
[[formats]]
name = "standard"
title = "Standard"
max_faction_count = 1
min_total_count = 39
hero_mandatory = true
banned = [
    { family = "YZ_05_U", faction = "AX" },
    { family = "AX_16_U", faction = "BR" },
]

[[formats]]
name = "doubles"
extends = "standard"
min_faction_count = 2
max_faction_count = 2
unset = ["max_rare_count"]
unban = [{ family = "AX_16_U", faction = "BR" }]
"#;
        let dto: FormatsConfigDto = toml::from_str(toml_str).unwrap();
        assert_eq!(dto.formats.len(), 2);
        assert_eq!(dto.formats[0].max_faction_count, Some(1));
        assert_eq!(dto.formats[0].max_rare_count, None);
        assert_eq!(dto.formats[0].banned.len(), 2);
        assert_eq!(dto.formats[1].extends.as_deref(), Some("standard"));
        assert_eq!(dto.formats[1].unset, ["max_rare_count"]);
        assert_eq!(dto.formats[1].unban[0].family, "AX_16_U");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let toml_str = r#"
[[formats]]
name = "standard"
max_mana = 4
"#;
        assert!(toml::from_str::<FormatsConfigDto>(toml_str).is_err());
    }
}
