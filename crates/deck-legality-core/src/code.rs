//! Violation codes and their human-readable rendering.
//!
//! Wire identifiers are persisted on deck records and must never be renamed.

use crate::formats::{BoundField, FormatRuleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder replaced by the violated bound in message templates.
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// One specific way a deck fails a format's constraints.
///
/// Variants are declared in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationCode {
    /// Fewer factions than the format's minimum.
    #[serde(rename = "ERR_MISSING_FACTION_COUNT")]
    MissingFactionCount,
    /// More factions than the format's maximum.
    #[serde(rename = "ERR_EXCEED_FACTION_COUNT")]
    ExceedFactionCount,
    /// Fewer cards than the format's minimum.
    #[serde(rename = "ERR_NOT_ENOUGH_CARD_COUNT")]
    NotEnoughCardCount,
    /// More rare cards than allowed.
    #[serde(rename = "ERR_EXCEED_RARE_COUNT")]
    ExceedRareCount,
    /// More unique cards than allowed.
    #[serde(rename = "ERR_EXCEED_UNIQUE_COUNT")]
    ExceedUniqueCount,
    /// A single unique card is present more than once.
    #[serde(rename = "ERR_UNIQUE_IS_REPEATED")]
    UniqueIsRepeated,
    /// Too many copies of one card family.
    #[serde(rename = "ERR_EXCEED_SAME_FAMILY_COUNT")]
    ExceedSameFamilyCount,
    /// No hero in a format that requires one.
    #[serde(rename = "ERR_MISSING_HERO")]
    MissingHero,
    /// Contains a card banned in the format.
    #[serde(rename = "ERR_CONTAINS_BANNED_CARD")]
    ContainsBannedCard,
}

impl ViolationCode {
    /// All codes, in evaluation order.
    pub const ALL: [Self; 9] = [
        Self::MissingFactionCount,
        Self::ExceedFactionCount,
        Self::NotEnoughCardCount,
        Self::ExceedRareCount,
        Self::ExceedUniqueCount,
        Self::UniqueIsRepeated,
        Self::ExceedSameFamilyCount,
        Self::MissingHero,
        Self::ContainsBannedCard,
    ];

    /// Returns the stable wire identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingFactionCount => "ERR_MISSING_FACTION_COUNT",
            Self::ExceedFactionCount => "ERR_EXCEED_FACTION_COUNT",
            Self::NotEnoughCardCount => "ERR_NOT_ENOUGH_CARD_COUNT",
            Self::ExceedRareCount => "ERR_EXCEED_RARE_COUNT",
            Self::ExceedUniqueCount => "ERR_EXCEED_UNIQUE_COUNT",
            Self::UniqueIsRepeated => "ERR_UNIQUE_IS_REPEATED",
            Self::ExceedSameFamilyCount => "ERR_EXCEED_SAME_FAMILY_COUNT",
            Self::MissingHero => "ERR_MISSING_HERO",
            Self::ContainsBannedCard => "ERR_CONTAINS_BANNED_CARD",
        }
    }

    /// Returns the English message template.
    ///
    /// Templates may contain [`COUNT_PLACEHOLDER`].
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::MissingFactionCount => "Does not reach the minimum faction count ({count})",
            Self::ExceedFactionCount => "Exceeds maximum faction count ({count})",
            Self::NotEnoughCardCount => "Does not have enough cards ({count})",
            Self::ExceedRareCount => "Exceeds the maximum RARE card count ({count})",
            Self::ExceedUniqueCount => "Exceeds the maximum UNIQUE card count ({count})",
            Self::UniqueIsRepeated => "There's more than a single copy of a UNIQUE card",
            Self::ExceedSameFamilyCount => {
                "Exceeds the maximum card count for any given family ({count})"
            }
            Self::MissingHero => "Missing hero",
            Self::ContainsBannedCard => "Contains a banned card",
        }
    }

    /// Returns the format bound interpolated into this code's message.
    #[must_use]
    pub fn bound_field(self) -> Option<BoundField> {
        match self {
            Self::MissingFactionCount => Some(BoundField::MinFactionCount),
            Self::ExceedFactionCount => Some(BoundField::MaxFactionCount),
            Self::NotEnoughCardCount => Some(BoundField::MinTotalCount),
            Self::ExceedRareCount => Some(BoundField::MaxRareCount),
            Self::ExceedUniqueCount => Some(BoundField::MaxUniqueCount),
            Self::ExceedSameFamilyCount => Some(BoundField::MaxSameFamilyCount),
            Self::UniqueIsRepeated | Self::MissingHero | Self::ContainsBannedCard => None,
        }
    }

    /// Renders the English message for a violation of `rules`.
    #[must_use]
    pub fn render(self, rules: &FormatRuleSet) -> String {
        interpolate(self.template(), self, rules)
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not a known violation code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown violation code `{0}`")]
pub struct UnknownCodeError(pub String);

impl FromStr for ViolationCode {
    type Err = UnknownCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCodeError(s.to_string()))
    }
}

fn interpolate(template: &str, code: ViolationCode, rules: &FormatRuleSet) -> String {
    if !template.contains(COUNT_PLACEHOLDER) {
        return template.to_string();
    }
    let count = code
        .bound_field()
        .and_then(|field| rules.bound(field))
        .map_or_else(|| "-".to_string(), |n| n.to_string());
    template.replace(COUNT_PLACEHOLDER, &count)
}

/// Localized message templates, keyed by violation code.
///
/// Codes without a translation fall back to the English template.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<ViolationCode, String>,
}

impl MessageCatalog {
    /// Creates a catalog that renders English messages.
    #[must_use]
    pub fn english() -> Self {
        Self::default()
    }

    /// Builds a catalog from a table keyed by wire identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is not a known violation code.
    pub fn from_table(table: &HashMap<String, String>) -> Result<Self, UnknownCodeError> {
        let templates = table
            .iter()
            .map(|(code, template)| Ok((code.parse::<ViolationCode>()?, template.clone())))
            .collect::<Result<HashMap<_, _>, UnknownCodeError>>()?;
        Ok(Self { templates })
    }

    /// Sets the template for one code.
    #[must_use]
    pub fn with_template(mut self, code: ViolationCode, template: impl Into<String>) -> Self {
        self.templates.insert(code, template.into());
        self
    }

    /// Returns the template used for `code`.
    #[must_use]
    pub fn template(&self, code: ViolationCode) -> &str {
        self.templates
            .get(&code)
            .map_or_else(|| code.template(), String::as_str)
    }

    /// Renders one violation of `rules`.
    #[must_use]
    pub fn render(&self, code: ViolationCode, rules: &FormatRuleSet) -> String {
        interpolate(self.template(code), code, rules)
    }

    /// Renders a list of violations of `rules`, preserving order.
    #[must_use]
    pub fn render_all(&self, codes: &[ViolationCode], rules: &FormatRuleSet) -> Vec<String> {
        codes.iter().map(|c| self.render(*c, rules)).collect()
    }

    /// Renders stored wire identifiers back to messages.
    ///
    /// # Errors
    ///
    /// Returns an error on the first identifier that is not a known code.
    pub fn render_stored<S: AsRef<str>>(
        &self,
        codes: &[S],
        rules: &FormatRuleSet,
    ) -> Result<Vec<String>, UnknownCodeError> {
        codes
            .iter()
            .map(|c| Ok(self.render(c.as_ref().parse()?, rules)))
            .collect()
    }
}
