//! Card catalog and parsed-reference cache.

use crate::card::{Card, CardReference, ReferenceError};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Errors building or loading a card catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// IO error reading the catalog file.
    #[error("Failed to read card catalog {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The catalog JSON is invalid.
    #[error("Failed to parse card catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two cards share the same reference.
    #[error("duplicate card reference `{reference}` in catalog")]
    Duplicate {
        /// The duplicated reference.
        reference: String,
    },
}

/// Read-only lookup of cards by reference.
///
/// Iteration is ordered by reference.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: BTreeMap<String, Card>,
}

impl CardCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list of cards.
    ///
    /// # Errors
    ///
    /// Returns an error if two cards share a reference.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for card in cards {
            catalog.insert(card)?;
        }
        Ok(catalog)
    }

    /// Parses a catalog from a JSON array of cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or contains duplicates.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(content)?;
        Self::from_cards(cards)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::debug!("Loaded {} card(s) from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Adds a card.
    ///
    /// # Errors
    ///
    /// Returns an error if a card with the same reference already exists.
    pub fn insert(&mut self, card: Card) -> Result<(), CatalogError> {
        if self.cards.contains_key(&card.reference) {
            return Err(CatalogError::Duplicate {
                reference: card.reference,
            });
        }
        self.cards.insert(card.reference.clone(), card);
        Ok(())
    }

    /// Looks up a card by reference.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&Card> {
        self.cards.get(reference)
    }

    /// Returns the number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if the catalog holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterates over all cards, ordered by reference.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}

/// Memo of parsed card references.
///
/// Owned by the caller and passed into extraction, so each worker keeps its
/// own cache and no state is shared between concurrent evaluations.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    parsed: HashMap<String, CardReference>,
}

impl ReferenceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed form of `reference`, parsing it on first use.
    ///
    /// Failed parses are not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is malformed.
    pub fn resolve(&mut self, reference: &str) -> Result<&CardReference, ReferenceError> {
        if !self.parsed.contains_key(reference) {
            let parsed = CardReference::parse(reference)?;
            self.parsed.insert(reference.to_string(), parsed);
        }
        Ok(&self.parsed[reference])
    }

    /// Returns the number of cached references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardType, Faction, Rarity};

    #[test]
    fn from_json_loads_cards() {
        let json = r#"[
            {"reference": "ALT_CORE_B_AX_01_C", "name": "Sierra", "faction": "AX", "type": "hero", "rarity": "C"},
            {"reference": "ALT_CORE_B_AX_08_R1", "faction": "AX", "type": "character", "rarity": "R"}
        ]"#;
        let catalog = CardCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("ALT_CORE_B_AX_01_C").unwrap().is_hero());
        assert!(catalog.get("ALT_CORE_B_AX_99_C").is_none());
    }

    #[test]
    fn duplicate_reference_is_rejected() {
        let card = Card::new(
            "ALT_CORE_B_AX_08_C",
            Faction::Axiom,
            CardType::Spell,
            Rarity::Common,
        );
        let err = CardCatalog::from_cards([card.clone(), card]).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate { .. }));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = CardCatalog::from_json("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn iteration_is_ordered_by_reference() {
        let catalog = CardCatalog::from_cards([
            Card::new("ALT_CORE_B_MU_02_C", Faction::Muna, CardType::Spell, Rarity::Common),
            Card::new("ALT_CORE_B_AX_02_C", Faction::Axiom, CardType::Spell, Rarity::Common),
        ])
        .unwrap();
        let refs: Vec<&str> = catalog.iter().map(|c| c.reference.as_str()).collect();
        assert_eq!(refs, ["ALT_CORE_B_AX_02_C", "ALT_CORE_B_MU_02_C"]);
    }

    #[test]
    fn cache_parses_once_and_skips_failures() {
        let mut cache = ReferenceCache::new();
        let key = cache
            .resolve("ALT_CORE_B_AX_08_R1")
            .unwrap()
            .family_key()
            .clone();
        assert_eq!(key.as_str(), "AX_08");
        cache.resolve("ALT_CORE_B_AX_08_R1").unwrap();
        assert_eq!(cache.len(), 1);

        assert!(cache.resolve("BROKEN").is_err());
        assert_eq!(cache.len(), 1);
    }
}
