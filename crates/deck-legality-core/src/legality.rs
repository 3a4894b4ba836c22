//! Legality updater: metrics once per deck, then every format in order.
//!
//! Results are persisted flat on the deck record, one pair of fields per
//! format:
//!
//! ```json
//! { "is_standard_legal": false, "standard_legality_errors": ["ERR_MISSING_HERO"] }
//! ```

use crate::catalog::{CardCatalog, ReferenceCache};
use crate::code::ViolationCode;
use crate::deck::{DeckList, DeckRecord};
use crate::evaluator::evaluate;
use crate::formats::{FormatName, FormatTable};
use crate::metrics::{DataError, DeckMetrics};
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const LEGAL_PREFIX: &str = "is_";
const LEGAL_SUFFIX: &str = "_legal";
const ERRORS_SUFFIX: &str = "_legality_errors";

/// Outcome of evaluating one deck against one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalityVerdict {
    /// The evaluated format.
    pub format: FormatName,
    /// Violations in evaluation order, empty if legal.
    pub violations: Vec<ViolationCode>,
}

impl LegalityVerdict {
    /// Returns true if there are no violations.
    #[must_use]
    pub fn is_legal(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Stored legality of a deck for one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatLegality {
    /// Format name.
    pub format: String,
    /// The `is_<format>_legal` flag.
    pub is_legal: bool,
    /// The `<format>_legality_errors` wire identifiers.
    pub errors: Vec<String>,
}

impl From<&LegalityVerdict> for FormatLegality {
    fn from(verdict: &LegalityVerdict) -> Self {
        Self {
            format: verdict.format.to_string(),
            is_legal: verdict.is_legal(),
            errors: verdict
                .violations
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }
}

/// Stored legality of a deck across formats, in format-table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckLegality {
    formats: Vec<FormatLegality>,
}

impl DeckLegality {
    /// Builds the stored form of a set of verdicts.
    #[must_use]
    pub fn from_verdicts(verdicts: &[LegalityVerdict]) -> Self {
        Self {
            formats: verdicts.iter().map(FormatLegality::from).collect(),
        }
    }

    /// Returns the stored legality for one format.
    #[must_use]
    pub fn get(&self, format: &str) -> Option<&FormatLegality> {
        self.formats.iter().find(|f| f.format == format)
    }

    /// Returns the stored flag for one format.
    #[must_use]
    pub fn is_legal(&self, format: &str) -> Option<bool> {
        self.get(format).map(|f| f.is_legal)
    }

    /// Iterates over stored formats.
    pub fn iter(&self) -> impl Iterator<Item = &FormatLegality> {
        self.formats.iter()
    }

    /// Returns true if nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    fn entry(&mut self, format: &str) -> &mut FormatLegality {
        let index = match self.formats.iter().position(|f| f.format == format) {
            Some(index) => index,
            None => {
                self.formats.push(FormatLegality {
                    format: format.to_string(),
                    is_legal: true,
                    errors: Vec::new(),
                });
                self.formats.len() - 1
            }
        };
        &mut self.formats[index]
    }
}

impl Serialize for DeckLegality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.formats.len() * 2))?;
        for f in &self.formats {
            map.serialize_entry(&format!("{LEGAL_PREFIX}{}{LEGAL_SUFFIX}", f.format), &f.is_legal)?;
            map.serialize_entry(&format!("{}{ERRORS_SUFFIX}", f.format), &f.errors)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DeckLegality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DeckLegalityVisitor)
    }
}

struct DeckLegalityVisitor;

impl<'de> Visitor<'de> for DeckLegalityVisitor {
    type Value = DeckLegality;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of `is_<format>_legal` and `<format>_legality_errors` fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut legality = DeckLegality::default();
        let mut flags = Vec::new();

        while let Some(key) = map.next_key::<String>()? {
            if let Some(format) = key.strip_suffix(ERRORS_SUFFIX) {
                legality.entry(format).errors = map.next_value()?;
            } else if let Some(format) = key
                .strip_prefix(LEGAL_PREFIX)
                .and_then(|k| k.strip_suffix(LEGAL_SUFFIX))
            {
                let flag: bool = map.next_value()?;
                legality.entry(format);
                flags.push((format.to_string(), flag));
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        // a missing flag is derived from the error list
        for f in &mut legality.formats {
            f.is_legal = f.errors.is_empty();
        }
        for (format, flag) in flags {
            legality.entry(&format).is_legal = flag;
        }
        Ok(legality)
    }
}

/// Computes and stores the legality of decks.
///
/// Borrows the immutable format table and card catalog; any number of
/// updaters may run concurrently over the same table.
#[derive(Debug, Clone, Copy)]
pub struct LegalityUpdater<'a> {
    formats: &'a FormatTable,
    catalog: &'a CardCatalog,
}

impl<'a> LegalityUpdater<'a> {
    /// Creates an updater.
    #[must_use]
    pub fn new(formats: &'a FormatTable, catalog: &'a CardCatalog) -> Self {
        Self { formats, catalog }
    }

    /// Returns the format table.
    #[must_use]
    pub fn formats(&self) -> &'a FormatTable {
        self.formats
    }

    /// Evaluates a deck against every format, in table order.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the deck's metrics cannot be extracted.
    pub fn evaluate(&self, deck: &DeckList) -> Result<Vec<LegalityVerdict>, DataError> {
        self.evaluate_with_cache(deck, &mut ReferenceCache::new())
    }

    /// Like [`evaluate`](Self::evaluate), reusing a reference cache.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the deck's metrics cannot be extracted.
    pub fn evaluate_with_cache(
        &self,
        deck: &DeckList,
        cache: &mut ReferenceCache,
    ) -> Result<Vec<LegalityVerdict>, DataError> {
        let metrics = DeckMetrics::extract(deck, self.catalog, cache)?;
        Ok(self
            .formats
            .iter()
            .map(|rules| LegalityVerdict {
                format: rules.name().clone(),
                violations: evaluate(&metrics, rules),
            })
            .collect())
    }

    /// Recomputes and stores the legality of a deck.
    ///
    /// The stored legality is replaced as a whole, so fields of formats no
    /// longer in the table are dropped. On error the record is untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the deck's metrics cannot be extracted.
    pub fn update_legality(&self, record: &mut DeckRecord) -> Result<(), DataError> {
        self.update_legality_with_cache(record, &mut ReferenceCache::new())
    }

    /// Like [`update_legality`](Self::update_legality), reusing a reference
    /// cache across decks.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the deck's metrics cannot be extracted.
    pub fn update_legality_with_cache(
        &self,
        record: &mut DeckRecord,
        cache: &mut ReferenceCache,
    ) -> Result<(), DataError> {
        let verdicts = self.evaluate_with_cache(&record.cards, cache)?;
        record.legality = DeckLegality::from_verdicts(&verdicts);
        tracing::debug!(
            deck = record.id,
            illegal = verdicts.iter().filter(|v| !v.is_legal()).count(),
            "Updated deck legality"
        );
        Ok(())
    }

    /// Recalculates the legality of many decks.
    ///
    /// Decks are processed one at a time and handed to `sink` in chunks of
    /// `options.chunk_size`. A deck that fails with a [`DataError`] is
    /// recorded in the report and not passed to the sink.
    ///
    /// # Errors
    ///
    /// Returns the first error returned by `sink`.
    pub fn recalculate<I, F, E>(
        &self,
        decks: I,
        options: &BatchOptions,
        mut sink: F,
    ) -> Result<BatchReport, E>
    where
        I: IntoIterator<Item = DeckRecord>,
        F: FnMut(Vec<DeckRecord>) -> Result<(), E>,
    {
        let chunk_size = options.chunk_size.max(1);
        let mut report = BatchReport::default();
        let mut cache = ReferenceCache::new();
        let mut chunk = Vec::with_capacity(chunk_size);

        for mut record in decks {
            if let Some(format) = &options.only_illegal_in {
                if record.legality.is_legal(format) == Some(true) {
                    report.skipped += 1;
                    continue;
                }
            }
            report.processed += 1;

            match self.update_legality_with_cache(&mut record, &mut cache) {
                Ok(()) => {
                    report.updated += 1;
                    chunk.push(record);
                }
                Err(error) => {
                    tracing::warn!(deck = record.id, "Failed to update legality: {error}");
                    report.failures.push(DeckFailure {
                        deck_id: record.id,
                        error,
                    });
                }
            }

            if chunk.len() >= chunk_size {
                tracing::debug!("Flushing {} deck(s)", chunk.len());
                sink(std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size)))?;
            }
        }
        if !chunk.is_empty() {
            tracing::debug!("Flushing {} deck(s)", chunk.len());
            sink(chunk)?;
        }

        tracing::info!(
            processed = report.processed,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Recalculated deck legality"
        );
        Ok(report)
    }
}

/// Options for [`LegalityUpdater::recalculate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Number of updated decks handed to the sink at once.
    pub chunk_size: usize,
    /// Only recalculate decks not stored as legal in this format.
    pub only_illegal_in: Option<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            only_illegal_in: None,
        }
    }
}

/// A deck whose legality could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckFailure {
    /// The deck's identifier.
    pub deck_id: u64,
    /// Why extraction failed.
    pub error: DataError,
}

/// Summary of a batch recalculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Decks evaluated.
    pub processed: usize,
    /// Decks whose legality was updated.
    pub updated: usize,
    /// Decks skipped by the `only_illegal_in` filter.
    pub skipped: usize,
    /// Decks that failed with a data error.
    pub failures: Vec<DeckFailure>,
}

impl BatchReport {
    /// Returns true if every processed deck was updated.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
