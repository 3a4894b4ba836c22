//! Deck composition and the persisted deck record.

use crate::catalog::CardCatalog;
use crate::legality::DeckLegality;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Errors building a deck or importing a decklist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum DeckError {
    /// A decklist line is not `<count> <reference>`.
    #[error("line {line}: failed to read `{content}`, expected `<count> <reference>`")]
    #[diagnostic(code(deck_legality::deck::malformed))]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A decklist line references a card missing from the catalog.
    #[error("line {line}: card `{reference}` does not exist")]
    #[diagnostic(code(deck_legality::deck::unknown_card))]
    UnknownCard {
        /// 1-based line number.
        line: usize,
        /// The missing reference.
        reference: String,
    },

    /// A decklist holds more than one hero.
    #[error("line {line}: multiple heroes present in the decklist")]
    #[diagnostic(
        code(deck_legality::deck::multiple_heroes),
        help("a deck holds exactly one hero")
    )]
    MultipleHeroes {
        /// 1-based line number of the second hero.
        line: usize,
    },

    /// A card was added with quantity 0.
    #[error("card `{reference}` must have a positive quantity")]
    #[diagnostic(code(deck_legality::deck::quantity))]
    InvalidQuantity {
        /// The offending reference.
        reference: String,
    },

    /// Merged quantities of a card exceed the counter range.
    #[error("card `{reference}` has too many copies")]
    #[diagnostic(code(deck_legality::deck::overflow))]
    QuantityOverflow {
        /// The offending reference.
        reference: String,
    },
}

/// One card of a deck and how many copies it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    /// Card reference.
    pub reference: String,
    /// Number of copies.
    pub quantity: u32,
}

/// The cards of a deck: an optional hero plus card entries.
///
/// Adding a present reference merges quantities. Decks read from storage
/// are taken as-is and may repeat a reference; metric extraction sums them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    #[serde(default)]
    hero: Option<String>,
    #[serde(default, rename = "cards")]
    entries: Vec<DeckEntry>,
}

impl DeckList {
    /// Creates an empty deck without a hero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hero.
    #[must_use]
    pub fn with_hero(mut self, reference: impl Into<String>) -> Self {
        self.hero = Some(reference.into());
        self
    }

    /// Replaces or clears the hero.
    pub fn set_hero(&mut self, reference: Option<String>) {
        self.hero = reference;
    }

    /// Returns the hero reference, if any.
    #[must_use]
    pub fn hero(&self) -> Option<&str> {
        self.hero.as_deref()
    }

    /// Returns the card entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    /// Returns the summed quantity of all entries, hero excluded.
    #[must_use]
    pub fn card_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |total, e| total.saturating_add(e.quantity))
    }

    /// Adds copies of a card, merging with an existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is 0 or the merged quantity
    /// overflows.
    pub fn add(&mut self, reference: impl Into<String>, quantity: u32) -> Result<(), DeckError> {
        let reference = reference.into();
        if quantity == 0 {
            return Err(DeckError::InvalidQuantity { reference });
        }
        match self.entries.iter_mut().find(|e| e.reference == reference) {
            Some(entry) => {
                entry.quantity = entry
                    .quantity
                    .checked_add(quantity)
                    .ok_or(DeckError::QuantityOverflow { reference })?;
            }
            None => self.entries.push(DeckEntry {
                reference,
                quantity,
            }),
        }
        Ok(())
    }

    /// Removes a card entirely, returning the quantity it had.
    pub fn remove(&mut self, reference: &str) -> Option<u32> {
        let index = self.entries.iter().position(|e| e.reference == reference)?;
        Some(self.entries.remove(index).quantity)
    }

    /// Imports a decklist: one `<count> <reference>` per line.
    ///
    /// Blank lines are skipped. A hero line fills the hero slot; its count
    /// is ignored. A decklist without a hero is accepted, the missing hero
    /// is then reported by formats that require one.
    ///
    /// # Errors
    ///
    /// Returns an error on a malformed line, an unknown card, a second hero
    /// or a zero count.
    pub fn parse_decklist(text: &str, catalog: &CardCatalog) -> Result<Self, DeckError> {
        let mut deck = Self::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.trim();
            if content.is_empty() {
                continue;
            }

            let mut parts = content.split_whitespace();
            let (Some(count), Some(reference), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(DeckError::Malformed {
                    line,
                    content: content.to_string(),
                });
            };
            let count: u32 = count.parse().map_err(|_| DeckError::Malformed {
                line,
                content: content.to_string(),
            })?;

            let card = catalog.get(reference).ok_or_else(|| DeckError::UnknownCard {
                line,
                reference: reference.to_string(),
            })?;

            if card.is_hero() {
                if deck.hero.is_some() {
                    return Err(DeckError::MultipleHeroes { line });
                }
                deck.hero = Some(card.reference.clone());
            } else {
                deck.add(reference, count)?;
            }
        }

        tracing::debug!(
            hero = deck.hero(),
            entries = deck.entries.len(),
            "Imported decklist"
        );
        Ok(deck)
    }

    /// Exports the deck in decklist format, hero first.
    #[must_use]
    pub fn to_decklist_text(&self) -> String {
        let mut text = String::new();
        if let Some(hero) = &self.hero {
            let _ = writeln!(text, "1 {hero}");
        }
        for entry in &self.entries {
            let _ = writeln!(text, "{} {}", entry.quantity, entry.reference);
        }
        text
    }
}

/// A deck as persisted: identity, cards and the per-format legality
/// fields the updater writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecord {
    /// Deck identifier.
    pub id: u64,
    /// Deck name.
    #[serde(default)]
    pub name: String,
    /// Hero and card entries.
    #[serde(flatten)]
    pub cards: DeckList,
    /// Stored `is_<format>_legal` / `<format>_legality_errors` fields.
    #[serde(flatten)]
    pub legality: DeckLegality,
}

impl DeckRecord {
    /// Creates a record with no stored legality.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, cards: DeckList) -> Self {
        Self {
            id,
            name: name.into(),
            cards,
            legality: DeckLegality::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardType, Faction, Rarity};

    fn catalog() -> CardCatalog {
        CardCatalog::from_cards([
            Card::new("ALT_CORE_B_AX_01_C", Faction::Axiom, CardType::Hero, Rarity::Common),
            Card::new("ALT_CORE_B_AX_02_C", Faction::Axiom, CardType::Hero, Rarity::Common),
            Card::new("ALT_CORE_B_AX_08_C", Faction::Axiom, CardType::Character, Rarity::Common),
            Card::new("ALT_CORE_B_AX_08_R1", Faction::Axiom, CardType::Character, Rarity::Rare),
        ])
        .unwrap()
    }

    #[test]
    fn add_merges_and_rejects_zero() {
        let mut deck = DeckList::new();
        deck.add("ALT_CORE_B_AX_08_C", 2).unwrap();
        deck.add("ALT_CORE_B_AX_08_C", 1).unwrap();
        assert_eq!(deck.entries().len(), 1);
        assert_eq!(deck.card_count(), 3);

        let err = deck.add("ALT_CORE_B_AX_08_R1", 0).unwrap_err();
        assert!(matches!(err, DeckError::InvalidQuantity { .. }));
        assert_eq!(deck.entries().len(), 1);
    }

    #[test]
    fn merged_quantity_overflow_is_rejected() {
        let text = "4294967295 ALT_CORE_B_AX_08_C\n1 ALT_CORE_B_AX_08_C";
        assert_eq!(
            DeckList::parse_decklist(text, &catalog()).unwrap_err(),
            DeckError::QuantityOverflow {
                reference: "ALT_CORE_B_AX_08_C".to_string()
            }
        );

        let stored: DeckList = serde_json::from_str(
            r#"{"cards": [
                {"reference": "ALT_CORE_B_AX_08_C", "quantity": 4294967295},
                {"reference": "ALT_CORE_B_AX_08_R1", "quantity": 2}
            ]}"#,
        )
        .unwrap();
        assert_eq!(stored.card_count(), u32::MAX);
    }

    #[test]
    fn remove_returns_quantity() {
        let mut deck = DeckList::new();
        deck.add("ALT_CORE_B_AX_08_C", 2).unwrap();
        assert_eq!(deck.remove("ALT_CORE_B_AX_08_C"), Some(2));
        assert_eq!(deck.remove("ALT_CORE_B_AX_08_C"), None);
        assert_eq!(deck.card_count(), 0);
    }

    #[test]
    fn parse_decklist_places_hero() {
        let text = "1 ALT_CORE_B_AX_01_C\n\n3 ALT_CORE_B_AX_08_C\n2 ALT_CORE_B_AX_08_R1\n";
        let deck = DeckList::parse_decklist(text, &catalog()).unwrap();
        assert_eq!(deck.hero(), Some("ALT_CORE_B_AX_01_C"));
        assert_eq!(deck.card_count(), 5);
        assert_eq!(deck.to_decklist_text(), "1 ALT_CORE_B_AX_01_C\n3 ALT_CORE_B_AX_08_C\n2 ALT_CORE_B_AX_08_R1\n");
    }

    #[test]
    fn parse_decklist_without_hero_is_accepted() {
        let deck = DeckList::parse_decklist("3 ALT_CORE_B_AX_08_C", &catalog()).unwrap();
        assert_eq!(deck.hero(), None);
    }

    #[test]
    fn parse_decklist_errors() {
        let catalog = catalog();
        assert_eq!(
            DeckList::parse_decklist("1 ALT_CORE_B_AX_01_C\nthree ALT_CORE_B_AX_08_C", &catalog)
                .unwrap_err(),
            DeckError::Malformed {
                line: 2,
                content: "three ALT_CORE_B_AX_08_C".to_string()
            }
        );
        assert!(matches!(
            DeckList::parse_decklist("3 ALT_CORE_B_AX_08_C extra", &catalog).unwrap_err(),
            DeckError::Malformed { line: 1, .. }
        ));
        assert!(matches!(
            DeckList::parse_decklist("3 ALT_CORE_B_AX_99_C", &catalog).unwrap_err(),
            DeckError::UnknownCard { line: 1, .. }
        ));
        assert_eq!(
            DeckList::parse_decklist("1 ALT_CORE_B_AX_01_C\n1 ALT_CORE_B_AX_02_C", &catalog)
                .unwrap_err(),
            DeckError::MultipleHeroes { line: 2 }
        );
        assert!(matches!(
            DeckList::parse_decklist("0 ALT_CORE_B_AX_08_C", &catalog).unwrap_err(),
            DeckError::InvalidQuantity { .. }
        ));
    }

    #[test]
    fn record_json_shape() {
        let mut cards = DeckList::new().with_hero("ALT_CORE_B_AX_01_C");
        cards.add("ALT_CORE_B_AX_08_C", 3).unwrap();
        let record = DeckRecord::new(7, "Sierra aggro", cards);

        insta::assert_json_snapshot!(record, @r#"
        {
          "id": 7,
          "name": "Sierra aggro",
          "hero": "ALT_CORE_B_AX_01_C",
          "cards": [
            {
              "reference": "ALT_CORE_B_AX_08_C",
              "quantity": 3
            }
          ]
        }
        "#);

        let json = serde_json::to_string(&record).unwrap();
        let back: DeckRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
