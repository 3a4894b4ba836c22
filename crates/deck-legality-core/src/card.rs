//! Card identity: factions, rarities, card types and reference parsing.
//!
//! A card reference encodes set, faction, card number and rarity variant:
//!
//! ```text
//! ALT_CORE_B_AX_08_R1       regular printing (6 segments)
//! ALT_CORE_B_YZ_05_U_1234   unique printing with its serial (7 segments)
//! ```
//!
//! Two identities are derived from the same parse:
//!
//! - [`FamilyKey`] (`AX_08`): every rarity variant of the same card. Used to
//!   cap how many copies of "the same card" a deck may hold.
//! - [`CardFamily`] (`AX_08_R1`): one rarity variant, independent of set and
//!   serial. Used to match ban-list entries.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Segment separator in card references.
const SEPARATOR: char = '_';

/// Segment positions inside a card reference.
const FACTION_SEGMENT: usize = 3;
const NUMBER_SEGMENT: usize = 4;
const RARITY_SEGMENT: usize = 5;

/// One of the six factions of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Axiom (`AX`).
    #[serde(rename = "AX")]
    Axiom,
    /// Bravos (`BR`).
    #[serde(rename = "BR")]
    Bravos,
    /// Lyra (`LY`).
    #[serde(rename = "LY")]
    Lyra,
    /// Muna (`MU`).
    #[serde(rename = "MU")]
    Muna,
    /// Ordis (`OR`).
    #[serde(rename = "OR")]
    Ordis,
    /// Yzmir (`YZ`).
    #[serde(rename = "YZ")]
    Yzmir,
}

impl Faction {
    /// All factions, in code order.
    pub const ALL: [Self; 6] = [
        Self::Axiom,
        Self::Bravos,
        Self::Lyra,
        Self::Muna,
        Self::Ordis,
        Self::Yzmir,
    ];

    /// Returns the two-letter faction code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Axiom => "AX",
            Self::Bravos => "BR",
            Self::Lyra => "LY",
            Self::Muna => "MU",
            Self::Ordis => "OR",
            Self::Yzmir => "YZ",
        }
    }

    /// Returns the lowercase faction name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Axiom => "axiom",
            Self::Bravos => "bravos",
            Self::Lyra => "lyra",
            Self::Muna => "muna",
            Self::Ordis => "ordis",
            Self::Yzmir => "yzmir",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for an unrecognised faction code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown faction code `{0}`, expected one of: AX, BR, LY, MU, OR, YZ")]
pub struct UnknownFaction(pub String);

impl FromStr for Faction {
    type Err = UnknownFaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.code() == s)
            .ok_or_else(|| UnknownFaction(s.to_string()))
    }
}

/// Rarity of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Common (`C`).
    #[serde(rename = "C")]
    Common,
    /// Rare (`R`), printed as `R1` (in-faction) or `R2` (out-of-faction).
    #[serde(rename = "R")]
    Rare,
    /// Unique (`U`).
    #[serde(rename = "U")]
    Unique,
}

impl Rarity {
    /// Maps the rarity segment of a reference to a rarity.
    #[must_use]
    pub fn from_reference_code(code: &str) -> Option<Self> {
        match code {
            "C" => Some(Self::Common),
            "R1" | "R2" => Some(Self::Rare),
            "U" => Some(Self::Unique),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::Rare => write!(f, "rare"),
            Self::Unique => write!(f, "unique"),
        }
    }
}

/// Type of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Spell.
    Spell,
    /// Landmark.
    Landmark,
    /// Token.
    Token,
    /// Character.
    Character,
    /// Hero; at most one per deck, held in the hero slot.
    Hero,
    /// Mana.
    Mana,
    /// Permanent.
    Permanent,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spell => "spell",
            Self::Landmark => "landmark",
            Self::Token => "token",
            Self::Character => "character",
            Self::Hero => "hero",
            Self::Mana => "mana",
            Self::Permanent => "permanent",
        };
        f.write_str(name)
    }
}

/// A card as supplied by the card catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique reference string (e.g., `ALT_CORE_B_AX_08_R1`).
    pub reference: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Faction the card is played in.
    ///
    /// This can differ from the faction segment of the reference: out-of-faction
    /// rares (`R2`) keep the reference of the card they were printed from.
    pub faction: Faction,
    /// Card type.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Rarity.
    pub rarity: Rarity,
}

impl Card {
    /// Creates a new card.
    #[must_use]
    pub fn new(
        reference: impl Into<String>,
        faction: Faction,
        card_type: CardType,
        rarity: Rarity,
    ) -> Self {
        Self {
            reference: reference.into(),
            name: String::new(),
            faction,
            card_type,
            rarity,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns true if this card is a hero.
    #[must_use]
    pub fn is_hero(&self) -> bool {
        self.card_type == CardType::Hero
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] - {} ({})", self.faction, self.name, self.rarity)
    }
}

/// Data-integrity error in a card reference or family identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum ReferenceError {
    /// The reference does not have 6 or 7 segments.
    #[error("card reference `{reference}` has {found} segment(s), expected 6 or 7")]
    #[diagnostic(
        code(deck_legality::reference::segments),
        help("references look like `ALT_CORE_B_AX_08_R1` or `ALT_CORE_B_AX_08_U_1234`")
    )]
    SegmentCount {
        /// The offending reference.
        reference: String,
        /// Number of segments found.
        found: usize,
    },

    /// A family identifier does not have 3 segments.
    #[error("card family `{family}` is malformed, expected FACTION_NUMBER_RARITY")]
    #[diagnostic(
        code(deck_legality::reference::family),
        help("families look like `AX_08_R1` or `YZ_05_U`")
    )]
    FamilyShape {
        /// The offending family identifier.
        family: String,
    },

    /// The faction segment is not a known faction code.
    #[error("`{reference}`: unknown faction code `{code}`")]
    #[diagnostic(code(deck_legality::reference::faction))]
    UnknownFaction {
        /// The offending reference or family.
        reference: String,
        /// The faction segment.
        code: String,
    },

    /// The number segment is not numeric.
    #[error("`{reference}`: card number `{number}` is not numeric")]
    #[diagnostic(code(deck_legality::reference::number))]
    InvalidNumber {
        /// The offending reference or family.
        reference: String,
        /// The number segment.
        number: String,
    },

    /// The rarity segment is not one of `C`, `R1`, `R2`, `U`.
    #[error("`{reference}`: unknown rarity variant `{code}`, expected C, R1, R2 or U")]
    #[diagnostic(code(deck_legality::reference::rarity))]
    UnknownRarity {
        /// The offending reference or family.
        reference: String,
        /// The rarity segment.
        code: String,
    },
}

/// Groups every rarity variant of the same card (`AX_08`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyKey(String);

impl FamilyKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One rarity variant of a card, independent of set and serial (`AX_08_R1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CardFamily(String);

impl CardFamily {
    /// Parses and validates a family identifier such as `YZ_05_U`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is not `FACTION_NUMBER_RARITY`.
    pub fn new(family: &str) -> Result<Self, ReferenceError> {
        let segments: Vec<&str> = family.split(SEPARATOR).collect();
        let [faction, number, rarity] = segments.as_slice() else {
            return Err(ReferenceError::FamilyShape {
                family: family.to_string(),
            });
        };
        validate_segments(family, faction, number, rarity)?;
        Ok(Self(family.to_string()))
    }

    /// Wraps a built-in family identifier, checked by the built-in table's
    /// tests.
    pub(crate) fn from_static(family: &'static str) -> Self {
        Self(family.to_string())
    }

    /// Returns the family as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed card reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReference {
    raw: String,
    faction: Faction,
    rarity: Rarity,
    family_key: FamilyKey,
    card_family: CardFamily,
    serial: Option<String>,
}

impl CardReference {
    /// Parses a card reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference does not follow
    /// `PREFIX_SET_PRODUCT_FACTION_NUMBER_RARITY[_SERIAL]`.
    pub fn parse(reference: &str) -> Result<Self, ReferenceError> {
        let segments: Vec<&str> = reference.split(SEPARATOR).collect();
        if !(6..=7).contains(&segments.len()) {
            return Err(ReferenceError::SegmentCount {
                reference: reference.to_string(),
                found: segments.len(),
            });
        }

        let faction_code = segments[FACTION_SEGMENT];
        let number = segments[NUMBER_SEGMENT];
        let rarity_code = segments[RARITY_SEGMENT];
        let (faction, rarity) = validate_segments(reference, faction_code, number, rarity_code)?;

        Ok(Self {
            raw: reference.to_string(),
            faction,
            rarity,
            family_key: FamilyKey(format!("{faction_code}{SEPARATOR}{number}")),
            card_family: CardFamily(format!(
                "{faction_code}{SEPARATOR}{number}{SEPARATOR}{rarity_code}"
            )),
            serial: segments.get(RARITY_SEGMENT + 1).map(ToString::to_string),
        })
    }

    /// Returns the raw reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the faction printed in the reference.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Returns the rarity encoded in the reference.
    #[must_use]
    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Returns the key shared by all rarity variants of this card.
    #[must_use]
    pub fn family_key(&self) -> &FamilyKey {
        &self.family_key
    }

    /// Returns the rarity-variant family used for ban-list matching.
    #[must_use]
    pub fn card_family(&self) -> &CardFamily {
        &self.card_family
    }

    /// Returns the serial of a unique printing, if any.
    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }
}

fn validate_segments(
    context: &str,
    faction: &str,
    number: &str,
    rarity: &str,
) -> Result<(Faction, Rarity), ReferenceError> {
    let faction = faction
        .parse::<Faction>()
        .map_err(|_| ReferenceError::UnknownFaction {
            reference: context.to_string(),
            code: faction.to_string(),
        })?;

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReferenceError::InvalidNumber {
            reference: context.to_string(),
            number: number.to_string(),
        });
    }

    let rarity = Rarity::from_reference_code(rarity).ok_or_else(|| ReferenceError::UnknownRarity {
        reference: context.to_string(),
        code: rarity.to_string(),
    })?;

    Ok((faction, rarity))
}
