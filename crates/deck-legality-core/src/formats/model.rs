//! Pure domain model for competitive formats.
//!
//! This module contains no serde deserialization and no I/O.
//! Invariants are enforced at construction time via validated newtypes
//! and by [`FormatTable::new`].

use crate::card::{CardFamily, Faction};
use crate::catalog::{CardCatalog, ReferenceCache};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated format name (non-empty, `[a-z0-9_]` only).
///
/// The name is embedded in persisted field names (`is_<name>_legal`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FormatName(String);

impl FormatName {
    /// Creates a new format name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or contains invalid characters.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyFormatName);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ModelError::InvalidFormatName {
                name: name.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Wraps a built-in name, checked by the built-in table's tests.
    pub(crate) fn from_static(name: &'static str) -> Self {
        Self(name.to_string())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A card family banned when played in a given faction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BannedCard {
    family: CardFamily,
    faction: Faction,
}

impl BannedCard {
    /// Creates a new ban entry.
    #[must_use]
    pub fn new(family: CardFamily, faction: Faction) -> Self {
        Self { family, faction }
    }

    /// Returns the banned family.
    #[must_use]
    pub fn family(&self) -> &CardFamily {
        &self.family
    }

    /// Returns the faction the ban applies to.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.faction
    }
}

impl fmt::Display for BannedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.family, self.faction)
    }
}

/// The optional numeric bounds of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundField {
    /// Inclusive lower bound on the number of factions.
    MinFactionCount,
    /// Inclusive upper bound on the number of factions.
    MaxFactionCount,
    /// Inclusive lower bound on the number of cards.
    MinTotalCount,
    /// Inclusive upper bound on rare cards.
    MaxRareCount,
    /// Inclusive upper bound on unique cards.
    MaxUniqueCount,
    /// Inclusive upper bound on copies of one family.
    MaxSameFamilyCount,
}

impl BoundField {
    /// All bounds, in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::MinFactionCount,
        Self::MaxFactionCount,
        Self::MinTotalCount,
        Self::MaxRareCount,
        Self::MaxUniqueCount,
        Self::MaxSameFamilyCount,
    ];

    /// Returns the configuration key of this bound.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::MinFactionCount => "min_faction_count",
            Self::MaxFactionCount => "max_faction_count",
            Self::MinTotalCount => "min_total_count",
            Self::MaxRareCount => "max_rare_count",
            Self::MaxUniqueCount => "max_unique_count",
            Self::MaxSameFamilyCount => "max_same_family_count",
        }
    }

    /// Looks up a bound by configuration key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// The constraints one competitive format enforces.
///
/// An unset bound means the format does not constrain that metric.
/// Formats derive from one another by copying a record and overriding
/// fields, see [`FormatRuleSet::derive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRuleSet {
    name: FormatName,
    title: String,
    min_faction_count: Option<u32>,
    max_faction_count: Option<u32>,
    min_total_count: Option<u32>,
    max_rare_count: Option<u32>,
    max_unique_count: Option<u32>,
    max_same_family_count: Option<u32>,
    enforce_individual_uniques: bool,
    hero_mandatory: bool,
    count_hero_in_total: bool,
    banned: BTreeSet<BannedCard>,
}

impl FormatRuleSet {
    /// Creates a format that constrains nothing.
    #[must_use]
    pub fn new(name: FormatName, title: impl Into<String>) -> Self {
        Self {
            name,
            title: title.into(),
            min_faction_count: None,
            max_faction_count: None,
            min_total_count: None,
            max_rare_count: None,
            max_unique_count: None,
            max_same_family_count: None,
            enforce_individual_uniques: false,
            hero_mandatory: false,
            count_hero_in_total: false,
            banned: BTreeSet::new(),
        }
    }

    /// Copies every constraint of this format under a new name.
    #[must_use]
    pub fn derive(&self, name: FormatName, title: impl Into<String>) -> Self {
        Self {
            name,
            title: title.into(),
            ..self.clone()
        }
    }

    /// Returns the format name.
    #[must_use]
    pub fn name(&self) -> &FormatName {
        &self.name
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the value of a bound.
    #[must_use]
    pub fn bound(&self, field: BoundField) -> Option<u32> {
        match field {
            BoundField::MinFactionCount => self.min_faction_count,
            BoundField::MaxFactionCount => self.max_faction_count,
            BoundField::MinTotalCount => self.min_total_count,
            BoundField::MaxRareCount => self.max_rare_count,
            BoundField::MaxUniqueCount => self.max_unique_count,
            BoundField::MaxSameFamilyCount => self.max_same_family_count,
        }
    }

    /// Sets or clears a bound.
    #[must_use]
    pub fn with_bound(mut self, field: BoundField, value: Option<u32>) -> Self {
        let slot = match field {
            BoundField::MinFactionCount => &mut self.min_faction_count,
            BoundField::MaxFactionCount => &mut self.max_faction_count,
            BoundField::MinTotalCount => &mut self.min_total_count,
            BoundField::MaxRareCount => &mut self.max_rare_count,
            BoundField::MaxUniqueCount => &mut self.max_unique_count,
            BoundField::MaxSameFamilyCount => &mut self.max_same_family_count,
        };
        *slot = value;
        self
    }

    /// Sets the minimum faction count.
    #[must_use]
    pub fn with_min_faction_count(self, n: u32) -> Self {
        self.with_bound(BoundField::MinFactionCount, Some(n))
    }

    /// Sets the maximum faction count.
    #[must_use]
    pub fn with_max_faction_count(self, n: u32) -> Self {
        self.with_bound(BoundField::MaxFactionCount, Some(n))
    }

    /// Sets the minimum card count.
    #[must_use]
    pub fn with_min_total_count(self, n: u32) -> Self {
        self.with_bound(BoundField::MinTotalCount, Some(n))
    }

    /// Sets the maximum rare card count.
    #[must_use]
    pub fn with_max_rare_count(self, n: u32) -> Self {
        self.with_bound(BoundField::MaxRareCount, Some(n))
    }

    /// Sets the maximum unique card count.
    #[must_use]
    pub fn with_max_unique_count(self, n: u32) -> Self {
        self.with_bound(BoundField::MaxUniqueCount, Some(n))
    }

    /// Sets the maximum copies of any one family.
    #[must_use]
    pub fn with_max_same_family_count(self, n: u32) -> Self {
        self.with_bound(BoundField::MaxSameFamilyCount, Some(n))
    }

    /// Returns true if a repeated unique card is a violation.
    #[must_use]
    pub fn enforce_individual_uniques(&self) -> bool {
        self.enforce_individual_uniques
    }

    /// Sets whether a repeated unique card is a violation.
    #[must_use]
    pub fn with_individual_uniques(mut self, enforce: bool) -> Self {
        self.enforce_individual_uniques = enforce;
        self
    }

    /// Returns true if the format requires a hero.
    #[must_use]
    pub fn hero_mandatory(&self) -> bool {
        self.hero_mandatory
    }

    /// Sets whether the format requires a hero.
    #[must_use]
    pub fn with_hero_mandatory(mut self, mandatory: bool) -> Self {
        self.hero_mandatory = mandatory;
        self
    }

    /// Returns true if the hero counts toward the minimum card count.
    #[must_use]
    pub fn count_hero_in_total(&self) -> bool {
        self.count_hero_in_total
    }

    /// Sets whether the hero counts toward the minimum card count.
    #[must_use]
    pub fn with_hero_in_total(mut self, counts: bool) -> Self {
        self.count_hero_in_total = counts;
        self
    }

    /// Returns the ban list.
    #[must_use]
    pub fn banned(&self) -> &BTreeSet<BannedCard> {
        &self.banned
    }

    /// Adds a ban entry.
    #[must_use]
    pub fn with_ban(mut self, ban: BannedCard) -> Self {
        self.banned.insert(ban);
        self
    }

    /// Removes a ban entry, if present.
    #[must_use]
    pub fn without_ban(mut self, ban: &BannedCard) -> Self {
        self.banned.remove(ban);
        self
    }

    /// Returns true if `family` played in `faction` is banned.
    #[must_use]
    pub fn is_banned(&self, family: &CardFamily, faction: Faction) -> bool {
        self.banned
            .iter()
            .any(|b| b.faction == faction && &b.family == family)
    }

    fn check_bounds(&self) -> Result<(), ModelError> {
        if let (Some(min), Some(max)) = (self.min_faction_count, self.max_faction_count) {
            if min > max {
                return Err(ModelError::InvertedFactionBounds {
                    format: self.name.clone(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// The ordered, immutable table of supported formats.
///
/// Table order is the order in which a deck is evaluated and in which its
/// per-format results are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTable {
    formats: Vec<FormatRuleSet>,
}

impl FormatTable {
    /// Creates a validated format table.
    ///
    /// # Errors
    ///
    /// Returns all validation errors: empty table, duplicate names,
    /// inverted faction bounds.
    pub fn new(formats: Vec<FormatRuleSet>) -> Result<Self, Vec<ModelError>> {
        let mut errors = Vec::new();
        if formats.is_empty() {
            errors.push(ModelError::EmptyTable);
        }

        let mut seen = HashSet::new();
        for format in &formats {
            if !seen.insert(format.name.clone()) {
                errors.push(ModelError::DuplicateFormat {
                    name: format.name.clone(),
                });
            }
            if let Err(e) = format.check_bounds() {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(Self { formats })
        } else {
            Err(errors)
        }
    }

    /// Wraps formats whose names and bounds are known to be valid.
    pub(crate) fn from_validated(formats: Vec<FormatRuleSet>) -> Self {
        Self { formats }
    }

    /// Looks up a format by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormatRuleSet> {
        self.formats.iter().find(|f| f.name.as_str() == name)
    }

    /// Iterates over formats in table order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatRuleSet> {
        self.formats.iter()
    }

    /// Returns the number of formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Always false; a table holds at least one format.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Reports ban entries that match no card of the catalog.
    ///
    /// A ban that matches nothing usually means a typo in the family or
    /// faction, which would silently never trigger.
    #[must_use]
    pub fn unmatched_bans(&self, catalog: &CardCatalog) -> Vec<(FormatName, BannedCard)> {
        let mut cache = ReferenceCache::new();
        let mut present: HashSet<(CardFamily, Faction)> = HashSet::new();
        for card in catalog.iter() {
            match cache.resolve(&card.reference) {
                Ok(parsed) => {
                    present.insert((parsed.card_family().clone(), card.faction));
                }
                Err(e) => tracing::warn!("Skipping malformed catalog card: {e}"),
            }
        }

        self.formats
            .iter()
            .flat_map(|f| f.banned.iter().map(move |b| (f, b)))
            .filter(|(_, b)| !present.contains(&(b.family.clone(), b.faction)))
            .map(|(f, b)| (f.name.clone(), b.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a FormatTable {
    type Item = &'a FormatRuleSet;
    type IntoIter = std::slice::Iter<'a, FormatRuleSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.formats.iter()
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Validation errors in the format model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Format name is empty.
    #[error("format name must not be empty")]
    EmptyFormatName,

    /// Format name contains invalid characters.
    #[error("invalid format name `{name}`: must be [a-z0-9_]")]
    InvalidFormatName {
        /// The invalid name.
        name: String,
    },

    /// Two formats share a name.
    #[error("format `{name}` is defined more than once")]
    DuplicateFormat {
        /// The duplicated name.
        name: FormatName,
    },

    /// `min_faction_count` is greater than `max_faction_count`.
    #[error("format `{format}`: min_faction_count ({min}) exceeds max_faction_count ({max})")]
    InvertedFactionBounds {
        /// The offending format.
        format: FormatName,
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The table defines no format.
    #[error("at least one format must be defined")]
    EmptyTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardType, Rarity};

    fn name(s: &str) -> FormatName {
        FormatName::new(s).unwrap()
    }

    #[test]
    fn format_name_validation() {
        assert!(FormatName::new("standard").is_ok());
        assert!(FormatName::new("draft_2").is_ok());
        assert_eq!(FormatName::new(""), Err(ModelError::EmptyFormatName));
        assert!(matches!(
            FormatName::new("Standard"),
            Err(ModelError::InvalidFormatName { .. })
        ));
        assert!(matches!(
            FormatName::new("exalts-championship"),
            Err(ModelError::InvalidFormatName { .. })
        ));
    }

    #[test]
    fn new_format_constrains_nothing() {
        let f = FormatRuleSet::new(name("open"), "Open");
        for field in BoundField::ALL {
            assert_eq!(f.bound(field), None);
        }
        assert!(!f.enforce_individual_uniques());
        assert!(!f.hero_mandatory());
        assert!(f.banned().is_empty());
    }

    #[test]
    fn derive_copies_then_overrides() {
        let base = FormatRuleSet::new(name("base"), "Base")
            .with_max_faction_count(1)
            .with_max_rare_count(15)
            .with_hero_mandatory(true);
        let derived = base
            .derive(name("child"), "Child")
            .with_max_faction_count(2)
            .with_bound(BoundField::MaxRareCount, None);

        assert_eq!(derived.name().as_str(), "child");
        assert_eq!(derived.bound(BoundField::MaxFactionCount), Some(2));
        assert_eq!(derived.bound(BoundField::MaxRareCount), None);
        assert!(derived.hero_mandatory());
        // the parent is untouched
        assert_eq!(base.bound(BoundField::MaxFactionCount), Some(1));
        assert_eq!(base.bound(BoundField::MaxRareCount), Some(15));
    }

    #[test]
    fn ban_matching_is_per_faction() {
        let family = CardFamily::new("YZ_05_U").unwrap();
        let f = FormatRuleSet::new(name("f"), "F").with_ban(BannedCard::new(family.clone(), Faction::Axiom));
        assert!(f.is_banned(&family, Faction::Axiom));
        assert!(!f.is_banned(&family, Faction::Yzmir));

        let f = f.without_ban(&BannedCard::new(family.clone(), Faction::Axiom));
        assert!(!f.is_banned(&family, Faction::Axiom));
    }

    #[test]
    fn bound_keys_round_trip() {
        for field in BoundField::ALL {
            assert_eq!(BoundField::from_key(field.key()), Some(field));
        }
        assert_eq!(BoundField::from_key("max_mana"), None);
    }

    #[test]
    fn table_rejects_duplicates_and_inverted_bounds() {
        let a = FormatRuleSet::new(name("a"), "A");
        let bad = FormatRuleSet::new(name("b"), "B")
            .with_min_faction_count(3)
            .with_max_faction_count(2);
        let errors = FormatTable::new(vec![a.clone(), a, bad]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ModelError::DuplicateFormat { .. }));
        assert!(matches!(errors[1], ModelError::InvertedFactionBounds { min: 3, max: 2, .. }));
    }

    #[test]
    fn table_rejects_empty() {
        assert_eq!(FormatTable::new(vec![]), Err(vec![ModelError::EmptyTable]));
    }

    #[test]
    fn unmatched_bans_are_reported() {
        let catalog = CardCatalog::from_cards([Card::new(
            "ALT_CORE_B_YZ_05_U_17",
            Faction::Axiom,
            CardType::Character,
            Rarity::Unique,
        )])
        .unwrap();
        let family = CardFamily::new("YZ_05_U").unwrap();
        let f = FormatRuleSet::new(name("f"), "F")
            .with_ban(BannedCard::new(family.clone(), Faction::Axiom))
            .with_ban(BannedCard::new(family, Faction::Lyra));
        let table = FormatTable::new(vec![f]).unwrap();

        let unmatched = table.unmatched_bans(&catalog);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].1.faction(), Faction::Lyra);
    }
}
