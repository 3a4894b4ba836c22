//! Aggregate deck metrics that format rules are evaluated against.

use crate::card::{CardFamily, CardType, Faction, FamilyKey, Rarity, ReferenceError};
use crate::catalog::{CardCatalog, ReferenceCache};
use crate::deck::DeckList;
use miette::Diagnostic;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Data-integrity error while extracting metrics.
///
/// Fatal for the one deck being evaluated. Never a legality verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum DataError {
    /// A deck references a card missing from the catalog.
    #[error("card `{reference}` is not in the card catalog")]
    #[diagnostic(
        code(deck_legality::data::unknown_card),
        help("refresh the card catalog before recalculating legality")
    )]
    UnknownCard {
        /// The missing reference.
        reference: String,
    },

    /// The hero slot holds a card that is not a hero.
    #[error("hero slot holds `{reference}`, which is a {card_type}")]
    #[diagnostic(code(deck_legality::data::not_a_hero))]
    NotAHero {
        /// The offending reference.
        reference: String,
        /// Its actual type.
        card_type: CardType,
    },

    /// A deck entry has a zero quantity.
    #[error("card `{reference}` has quantity 0")]
    #[diagnostic(code(deck_legality::data::quantity))]
    ZeroQuantity {
        /// The offending reference.
        reference: String,
    },

    /// Summed quantities do not fit the counters.
    #[error("quantity of `{reference}` overflows the deck's card counts")]
    #[diagnostic(code(deck_legality::data::overflow))]
    QuantityOverflow {
        /// The entry whose quantity overflowed.
        reference: String,
    },

    /// A card reference is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Reference(#[from] ReferenceError),
}

/// Metrics of one deck, computed in a single pass over its entries.
///
/// Read-only input to every format evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeckMetrics {
    /// Distinct factions among the hero and all entries.
    pub faction_count: u32,
    /// Sum of quantities, hero excluded.
    pub total_count: u32,
    /// Sum of quantities of rare cards.
    pub rare_count: u32,
    /// Sum of quantities of unique cards.
    pub unique_count: u32,
    /// True if any single unique card is held more than once, summed over
    /// entries sharing its reference.
    pub repeats_same_unique: bool,
    /// Summed quantity per family key.
    pub family_count: BTreeMap<FamilyKey, u32>,
    /// `(card family, faction)` of every entry, in deck order.
    pub card_families: Vec<(CardFamily, Faction)>,
    /// True if the deck has a hero.
    pub has_hero: bool,
}

impl DeckMetrics {
    /// Extracts metrics from a deck.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if a card is missing from the catalog, the
    /// hero slot holds a non-hero, a quantity is zero or overflows, or a
    /// reference is malformed. Nothing is silently skipped: a wrong family
    /// key would corrupt ban checks.
    ///
    /// Stored decks may list a reference more than once; such entries
    /// count as one.
    pub fn extract(
        deck: &DeckList,
        catalog: &CardCatalog,
        cache: &mut ReferenceCache,
    ) -> Result<Self, DataError> {
        let mut metrics = Self::default();
        let mut factions = BTreeSet::new();
        let mut unique_copies: BTreeMap<&str, u32> = BTreeMap::new();

        if let Some(reference) = deck.hero() {
            let hero = catalog.get(reference).ok_or_else(|| DataError::UnknownCard {
                reference: reference.to_string(),
            })?;
            if !hero.is_hero() {
                return Err(DataError::NotAHero {
                    reference: reference.to_string(),
                    card_type: hero.card_type,
                });
            }
            factions.insert(hero.faction);
            metrics.has_hero = true;
        }

        for entry in deck.entries() {
            if entry.quantity == 0 {
                return Err(DataError::ZeroQuantity {
                    reference: entry.reference.clone(),
                });
            }
            let card = catalog
                .get(&entry.reference)
                .ok_or_else(|| DataError::UnknownCard {
                    reference: entry.reference.clone(),
                })?;
            let parsed = cache.resolve(&entry.reference)?;

            let reference = entry.reference.as_str();
            let quantity = entry.quantity;

            accumulate(&mut metrics.total_count, quantity, reference)?;
            match card.rarity {
                Rarity::Rare => accumulate(&mut metrics.rare_count, quantity, reference)?,
                Rarity::Unique => {
                    accumulate(&mut metrics.unique_count, quantity, reference)?;
                    let copies = unique_copies.entry(reference).or_insert(0);
                    accumulate(copies, quantity, reference)?;
                    if *copies > 1 {
                        metrics.repeats_same_unique = true;
                    }
                }
                Rarity::Common => {}
            }
            factions.insert(card.faction);
            let family = metrics
                .family_count
                .entry(parsed.family_key().clone())
                .or_insert(0);
            accumulate(family, quantity, reference)?;
            metrics
                .card_families
                .push((parsed.card_family().clone(), card.faction));
        }

        metrics.faction_count = u32::try_from(factions.len()).unwrap_or(u32::MAX);
        tracing::trace!(?metrics, "Extracted deck metrics");
        Ok(metrics)
    }

    /// Returns the highest quantity held of any one family, 0 if none.
    #[must_use]
    pub fn max_family_count(&self) -> u32 {
        self.family_count.values().copied().max().unwrap_or(0)
    }
}

fn accumulate(counter: &mut u32, quantity: u32, reference: &str) -> Result<(), DataError> {
    *counter = counter
        .checked_add(quantity)
        .ok_or_else(|| DataError::QuantityOverflow {
            reference: reference.to_string(),
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn catalog() -> CardCatalog {
        CardCatalog::from_cards([
            Card::new("ALT_CORE_B_AX_01_C", Faction::Axiom, CardType::Hero, Rarity::Common),
            Card::new("ALT_CORE_B_AX_08_C", Faction::Axiom, CardType::Character, Rarity::Common),
            Card::new("ALT_CORE_B_AX_08_R1", Faction::Axiom, CardType::Character, Rarity::Rare),
            Card::new("ALT_CORE_B_BR_30_R2", Faction::Axiom, CardType::Spell, Rarity::Rare),
            Card::new("ALT_CORE_B_LY_12_U_7", Faction::Lyra, CardType::Character, Rarity::Unique),
            Card::new("ALT_CORE_B_LY_bad_C", Faction::Lyra, CardType::Spell, Rarity::Common),
        ])
        .unwrap()
    }

    fn extract(deck: &DeckList) -> Result<DeckMetrics, DataError> {
        DeckMetrics::extract(deck, &catalog(), &mut ReferenceCache::new())
    }

    #[test]
    fn empty_deck_without_hero() {
        let m = extract(&DeckList::new()).unwrap();
        assert_eq!(m, DeckMetrics::default());
        assert_eq!(m.max_family_count(), 0);
    }

    #[test]
    fn hero_only_counts_faction_not_cards() {
        let deck = DeckList::new().with_hero("ALT_CORE_B_AX_01_C");
        let m = extract(&deck).unwrap();
        assert!(m.has_hero);
        assert_eq!(m.faction_count, 1);
        assert_eq!(m.total_count, 0);
        assert!(m.family_count.is_empty());
    }

    #[test]
    fn counts_rarities_families_and_factions() {
        let mut deck = DeckList::new().with_hero("ALT_CORE_B_AX_01_C");
        deck.add("ALT_CORE_B_AX_08_C", 2).unwrap();
        deck.add("ALT_CORE_B_AX_08_R1", 2).unwrap();
        deck.add("ALT_CORE_B_BR_30_R2", 1).unwrap();
        deck.add("ALT_CORE_B_LY_12_U_7", 1).unwrap();

        let m = extract(&deck).unwrap();
        assert_eq!(m.total_count, 6);
        assert_eq!(m.rare_count, 3);
        assert_eq!(m.unique_count, 1);
        assert!(!m.repeats_same_unique);
        // R2 rares are played in the card's faction, not the reference's
        assert_eq!(m.faction_count, 2);
        assert_eq!(m.max_family_count(), 4);
        assert_eq!(
            m.card_families
                .iter()
                .map(|(fam, fac)| format!("{fam}/{fac}"))
                .collect::<Vec<_>>(),
            ["AX_08_C/AX", "AX_08_R1/AX", "BR_30_R2/AX", "LY_12_U/LY"]
        );
    }

    #[test]
    fn repeated_unique_is_flagged() {
        let mut deck = DeckList::new();
        deck.add("ALT_CORE_B_LY_12_U_7", 2).unwrap();
        let m = extract(&deck).unwrap();
        assert!(m.repeats_same_unique);
        assert_eq!(m.unique_count, 2);
    }

    #[test]
    fn duplicate_stored_entries_count_as_one_card() {
        let deck: DeckList = serde_json::from_str(
            r#"{
                "hero": "ALT_CORE_B_AX_01_C",
                "cards": [
                    {"reference": "ALT_CORE_B_LY_12_U_7", "quantity": 1},
                    {"reference": "ALT_CORE_B_LY_12_U_7", "quantity": 1},
                    {"reference": "ALT_CORE_B_AX_08_C", "quantity": 27}
                ]
            }"#,
        )
        .unwrap();
        let m = extract(&deck).unwrap();
        assert!(m.repeats_same_unique);
        assert_eq!(m.unique_count, 2);
        let lyra: Vec<u32> = m
            .family_count
            .iter()
            .filter(|(key, _)| key.as_str() == "LY_12")
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(lyra, [2]);

        let violations = crate::evaluator::evaluate(&m, &crate::formats::builtin::draft());
        assert_eq!(violations, [crate::code::ViolationCode::UniqueIsRepeated]);
    }

    #[test]
    fn overflowing_stored_quantities_are_a_data_error() {
        let deck: DeckList = serde_json::from_str(
            r#"{"cards": [
                {"reference": "ALT_CORE_B_AX_08_R1", "quantity": 4294967295},
                {"reference": "ALT_CORE_B_AX_08_R1", "quantity": 1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            extract(&deck).unwrap_err(),
            DataError::QuantityOverflow {
                reference: "ALT_CORE_B_AX_08_R1".to_string()
            }
        );
    }

    #[test]
    fn unknown_card_is_a_data_error() {
        let mut deck = DeckList::new();
        deck.add("ALT_CORE_B_MU_99_C", 1).unwrap();
        assert_eq!(
            extract(&deck).unwrap_err(),
            DataError::UnknownCard {
                reference: "ALT_CORE_B_MU_99_C".to_string()
            }
        );
    }

    #[test]
    fn malformed_reference_is_a_data_error() {
        let mut deck = DeckList::new();
        deck.add("ALT_CORE_B_LY_bad_C", 1).unwrap();
        assert!(matches!(
            extract(&deck).unwrap_err(),
            DataError::Reference(ReferenceError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn non_hero_in_hero_slot_is_a_data_error() {
        let deck = DeckList::new().with_hero("ALT_CORE_B_AX_08_C");
        assert!(matches!(
            extract(&deck).unwrap_err(),
            DataError::NotAHero { card_type: CardType::Character, .. }
        ));
    }

    #[test]
    fn zero_quantity_from_storage_is_a_data_error() {
        let deck: DeckList = serde_json::from_str(
            r#"{"hero": null, "cards": [{"reference": "ALT_CORE_B_AX_08_C", "quantity": 0}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract(&deck).unwrap_err(),
            DataError::ZeroQuantity { .. }
        ));
    }
}
