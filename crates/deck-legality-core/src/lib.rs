//! # deck-legality-core
//!
//! Deck legality engine: classifies a deck against every competitive
//! format and reports stable violation codes.
//!
//! The pipeline is:
//!
//! - [`DeckMetrics::extract`] walks a [`DeckList`] once
//! - [`evaluate`] applies one [`FormatRuleSet`] to those metrics
//! - [`LegalityUpdater`] runs every format of a [`FormatTable`] and stores
//!   the verdicts on a [`DeckRecord`]
//! - [`MessageCatalog`] renders [`ViolationCode`]s for display
//!
//! ## Example
//!
//! ```ignore
//! use deck_legality_core::{CardCatalog, Config, DeckList, LegalityUpdater};
//!
//! let config = Config::default();
//! let catalog = CardCatalog::from_file("cards.json".as_ref())?;
//! let deck = DeckList::parse_decklist(&text, &catalog)?;
//!
//! let updater = LegalityUpdater::new(&config.formats, &catalog);
//! for verdict in updater.evaluate(&deck)? {
//!     println!("{}: {:?}", verdict.format, verdict.violations);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod card;
pub mod card_status;
pub mod catalog;
pub mod code;
pub mod config;
pub mod deck;
pub mod evaluator;
pub mod formats;
pub mod legality;
pub mod metrics;

pub use card::{Card, CardFamily, CardReference, CardType, Faction, FamilyKey, Rarity, ReferenceError};
pub use catalog::{CardCatalog, CatalogError, ReferenceCache};
pub use code::{MessageCatalog, UnknownCodeError, ViolationCode};
pub use config::{BatchConfig, Config, ConfigError};
pub use deck::{DeckEntry, DeckError, DeckList, DeckRecord};
pub use evaluator::evaluate;
pub use formats::{
    builtin_table, load_formats_from_toml, BannedCard, BoundField, FormatName, FormatRuleSet,
    FormatTable, LoadFormatsError,
};
pub use legality::{
    BatchOptions, BatchReport, DeckFailure, DeckLegality, FormatLegality, LegalityUpdater,
    LegalityVerdict,
};
pub use metrics::{DataError, DeckMetrics};
