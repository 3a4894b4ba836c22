//! Card-level ban status: which catalog cards a format bans.

use crate::card::{Card, CardReference, ReferenceError};
use crate::catalog::{CardCatalog, ReferenceCache};
use crate::formats::{FormatRuleSet, FormatTable};

/// Returns every catalog card banned in `rules`, ordered by reference.
///
/// A card is banned when its `(card family, faction)` pair is on the
/// format's ban list.
///
/// # Errors
///
/// Returns an error if a catalog card has a malformed reference.
pub fn banned_cards<'c>(
    catalog: &'c CardCatalog,
    rules: &FormatRuleSet,
) -> Result<Vec<&'c Card>, ReferenceError> {
    if rules.banned().is_empty() {
        return Ok(Vec::new());
    }
    let mut cache = ReferenceCache::new();
    let mut banned = Vec::new();
    for card in catalog.iter() {
        let parsed = cache.resolve(&card.reference)?;
        if rules.is_banned(parsed.card_family(), card.faction) {
            banned.push(card);
        }
    }
    tracing::debug!("{} card(s) banned in {}", banned.len(), rules.name());
    Ok(banned)
}

/// Returns, for one card, the formats of the table that ban it.
///
/// # Errors
///
/// Returns an error if the card's reference is malformed.
pub fn banned_in<'t>(
    card: &Card,
    formats: &'t FormatTable,
) -> Result<Vec<&'t FormatRuleSet>, ReferenceError> {
    let parsed = CardReference::parse(&card.reference)?;
    Ok(formats
        .iter()
        .filter(|f| f.is_banned(parsed.card_family(), card.faction))
        .collect())
}
