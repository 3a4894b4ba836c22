//! Rule evaluation: one format against one set of deck metrics.

use crate::code::ViolationCode;
use crate::formats::{BoundField, FormatRuleSet};
use crate::metrics::DeckMetrics;

/// A single check: returns true if `rules` is violated by `metrics`.
type Check = fn(&DeckMetrics, &FormatRuleSet) -> bool;

/// Every check with the code it reports, in evaluation order.
const CHECKS: [(ViolationCode, Check); 9] = [
    (ViolationCode::MissingFactionCount, too_few_factions),
    (ViolationCode::ExceedFactionCount, too_many_factions),
    (ViolationCode::NotEnoughCardCount, too_few_cards),
    (ViolationCode::ExceedRareCount, too_many_rares),
    (ViolationCode::ExceedUniqueCount, too_many_uniques),
    (ViolationCode::UniqueIsRepeated, repeated_unique),
    (ViolationCode::ExceedSameFamilyCount, too_many_of_one_family),
    (ViolationCode::MissingHero, missing_hero),
    (ViolationCode::ContainsBannedCard, contains_banned_card),
];

/// Evaluates `rules` against `metrics`.
///
/// All checks run; the result keeps evaluation order and is empty for a
/// legal deck. Unset bounds are skipped, never treated as zero.
#[must_use]
pub fn evaluate(metrics: &DeckMetrics, rules: &FormatRuleSet) -> Vec<ViolationCode> {
    CHECKS
        .iter()
        .filter(|(_, check)| check(metrics, rules))
        .map(|(code, _)| *code)
        .collect()
}

fn below(value: u32, rules: &FormatRuleSet, field: BoundField) -> bool {
    rules.bound(field).is_some_and(|min| value < min)
}

fn above(value: u32, rules: &FormatRuleSet, field: BoundField) -> bool {
    rules.bound(field).is_some_and(|max| value > max)
}

fn too_few_factions(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    below(m.faction_count, r, BoundField::MinFactionCount)
}

fn too_many_factions(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    above(m.faction_count, r, BoundField::MaxFactionCount)
}

fn too_few_cards(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    let total = if r.count_hero_in_total() && m.has_hero {
        m.total_count.saturating_add(1)
    } else {
        m.total_count
    };
    below(total, r, BoundField::MinTotalCount)
}

fn too_many_rares(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    above(m.rare_count, r, BoundField::MaxRareCount)
}

fn too_many_uniques(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    above(m.unique_count, r, BoundField::MaxUniqueCount)
}

fn repeated_unique(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    r.enforce_individual_uniques() && m.repeats_same_unique
}

fn too_many_of_one_family(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    above(m.max_family_count(), r, BoundField::MaxSameFamilyCount)
}

fn missing_hero(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    r.hero_mandatory() && !m.has_hero
}

fn contains_banned_card(m: &DeckMetrics, r: &FormatRuleSet) -> bool {
    !r.banned().is_empty()
        && m
            .card_families
            .iter()
            .any(|(family, faction)| r.is_banned(family, *faction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardFamily, Faction, FamilyKey};
    use crate::formats::{builtin, BannedCard, FormatName};
    use ViolationCode as V;

    fn open() -> FormatRuleSet {
        FormatRuleSet::new(FormatName::new("open").unwrap(), "Open")
    }

    fn hero_deck(total: u32) -> DeckMetrics {
        DeckMetrics {
            faction_count: 1,
            total_count: total,
            has_hero: true,
            ..DeckMetrics::default()
        }
    }

    fn family_key(s: &str) -> FamilyKey {
        serde_json::from_str(&format!("\"{s}\"")).unwrap()
    }

    #[test]
    fn unconstrained_format_accepts_anything() {
        let metrics = DeckMetrics {
            faction_count: 6,
            rare_count: 40,
            unique_count: 12,
            repeats_same_unique: true,
            ..DeckMetrics::default()
        };
        assert!(evaluate(&metrics, &open()).is_empty());
    }

    #[test]
    fn zero_bound_is_enforced() {
        let rules = open().with_max_unique_count(0);
        let metrics = DeckMetrics {
            unique_count: 1,
            ..hero_deck(39)
        };
        assert_eq!(evaluate(&metrics, &rules), [V::ExceedUniqueCount]);
        assert!(evaluate(&hero_deck(39), &rules).is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let rules = open()
            .with_min_faction_count(2)
            .with_max_faction_count(2)
            .with_min_total_count(39)
            .with_max_rare_count(15);
        let metrics = DeckMetrics {
            faction_count: 2,
            rare_count: 15,
            ..hero_deck(39)
        };
        assert!(evaluate(&metrics, &rules).is_empty());
    }

    #[test]
    fn empty_deck_fails_standard_in_order() {
        let violations = evaluate(&DeckMetrics::default(), &builtin::standard());
        assert_eq!(violations, [V::NotEnoughCardCount, V::MissingHero]);
    }

    #[test]
    fn every_check_accumulates() {
        let rules = open()
            .with_min_faction_count(3)
            .with_max_faction_count(1)
            .with_min_total_count(39)
            .with_max_rare_count(1)
            .with_max_unique_count(0)
            .with_max_same_family_count(3)
            .with_individual_uniques(true)
            .with_hero_mandatory(true)
            .with_ban(BannedCard::new(
                CardFamily::new("YZ_05_U").unwrap(),
                Faction::Axiom,
            ));
        // min 3 > max 1 is rejected by the table, not by evaluation
        let metrics = DeckMetrics {
            faction_count: 2,
            total_count: 10,
            rare_count: 2,
            unique_count: 2,
            repeats_same_unique: true,
            family_count: [(family_key("YZ_05"), 4)].into_iter().collect(),
            card_families: vec![(CardFamily::new("YZ_05_U").unwrap(), Faction::Axiom)],
            has_hero: false,
        };
        assert_eq!(evaluate(&metrics, &rules), ViolationCode::ALL);
    }

    #[test]
    fn hero_counts_toward_total_only_when_configured() {
        let draft = builtin::draft();
        assert!(evaluate(&hero_deck(29), &draft).is_empty());
        assert_eq!(evaluate(&hero_deck(28), &draft), [V::NotEnoughCardCount]);
        assert!(evaluate(&hero_deck(u32::MAX), &draft).is_empty());

        let no_hero = DeckMetrics {
            has_hero: false,
            ..hero_deck(29)
        };
        assert_eq!(evaluate(&no_hero, &draft), [V::NotEnoughCardCount]);

        let standard = builtin::standard();
        assert_eq!(evaluate(&hero_deck(38), &standard), [V::NotEnoughCardCount]);
    }

    #[test]
    fn ban_matches_family_and_faction() {
        let standard = builtin::standard();
        let banned_in_axiom = DeckMetrics {
            card_families: vec![(CardFamily::new("YZ_05_U").unwrap(), Faction::Axiom)],
            ..hero_deck(39)
        };
        assert_eq!(evaluate(&banned_in_axiom, &standard), [V::ContainsBannedCard]);

        let allowed_in_lyra = DeckMetrics {
            card_families: vec![(CardFamily::new("YZ_05_U").unwrap(), Faction::Lyra)],
            ..hero_deck(39)
        };
        assert!(evaluate(&allowed_in_lyra, &standard).is_empty());

        // draft has no ban list
        assert!(evaluate(&banned_in_axiom, &builtin::draft()).is_empty());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let metrics = DeckMetrics {
            faction_count: 3,
            rare_count: 20,
            ..DeckMetrics::default()
        };
        let rules = builtin::doubles();
        let first = evaluate(&metrics, &rules);
        for _ in 0..10 {
            assert_eq!(evaluate(&metrics, &rules), first);
        }
        assert_eq!(
            first,
            [
                V::ExceedFactionCount,
                V::NotEnoughCardCount,
                V::ExceedRareCount,
                V::MissingHero,
            ]
        );
    }
}
