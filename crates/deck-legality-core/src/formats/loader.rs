//! DTO → Domain model conversion with validation.

use crate::card::{CardFamily, Faction, ReferenceError};

use super::config_dto::{BannedCardDto, FormatDto, FormatsConfigDto};
use super::model::{BannedCard, BoundField, FormatName, FormatRuleSet, FormatTable, ModelError};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "formats[0].name").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// `extends` names a format that is not defined earlier in the file.
    #[error("format `{format}` extends `{parent}`, which is not defined before it")]
    UnknownParent {
        /// The deriving format.
        format: String,
        /// The missing parent.
        parent: String,
    },

    /// `unset` names something that is not a bound.
    #[error("format `{format}`: cannot unset `{field}`, expected one of: {}", bound_keys())]
    UnknownBound {
        /// The offending format.
        format: String,
        /// The unknown key.
        field: String,
    },

    /// A ban entry has an unknown faction code.
    #[error("{context}: unknown faction code `{value}`, expected: AX, BR, LY, MU, OR, YZ")]
    UnknownFaction {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// A ban entry has a malformed family.
    #[error("{context}: {source}")]
    Family {
        /// Where the error occurred.
        context: String,
        /// The underlying parse error.
        source: ReferenceError,
    },

    /// Cross-format errors from table construction.
    #[error("format table validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<ModelError>),
}

fn bound_keys() -> String {
    BoundField::ALL
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `FormatsConfigDto` to a validated `FormatTable`.
///
/// Formats may only extend formats defined earlier in the list, which
/// rules out inheritance cycles.
///
/// # Errors
///
/// Returns the first error encountered during conversion, or all
/// table-level errors at once.
pub fn load(dto: FormatsConfigDto) -> Result<FormatTable, LoadError> {
    let mut formats: Vec<FormatRuleSet> = Vec::with_capacity(dto.formats.len());

    for (i, format_dto) in dto.formats.into_iter().enumerate() {
        let format = convert_format(format_dto, i, &formats)?;
        tracing::debug!("Loaded format `{}`", format.name());
        formats.push(format);
    }

    FormatTable::new(formats).map_err(LoadError::CrossRef)
}

fn convert_format(
    dto: FormatDto,
    index: usize,
    defined: &[FormatRuleSet],
) -> Result<FormatRuleSet, LoadError> {
    let ctx = format!("formats[{index}]");
    let name = FormatName::new(&dto.name).map_err(|e| LoadError::Validation {
        context: format!("{ctx}.name"),
        source: e,
    })?;
    let title = dto.title.unwrap_or_else(|| dto.name.clone());

    let mut format = match dto.extends {
        Some(parent) => defined
            .iter()
            .find(|f| f.name().as_str() == parent)
            .map(|f| f.derive(name, title.clone()))
            .ok_or_else(|| LoadError::UnknownParent {
                format: dto.name.clone(),
                parent,
            })?,
        None => FormatRuleSet::new(name, title),
    };

    for key in &dto.unset {
        let field = BoundField::from_key(key).ok_or_else(|| LoadError::UnknownBound {
            format: dto.name.clone(),
            field: key.clone(),
        })?;
        format = format.with_bound(field, None);
    }

    let bounds = [
        (BoundField::MinFactionCount, dto.min_faction_count),
        (BoundField::MaxFactionCount, dto.max_faction_count),
        (BoundField::MinTotalCount, dto.min_total_count),
        (BoundField::MaxRareCount, dto.max_rare_count),
        (BoundField::MaxUniqueCount, dto.max_unique_count),
        (BoundField::MaxSameFamilyCount, dto.max_same_family_count),
    ];
    for (field, value) in bounds {
        if value.is_some() {
            format = format.with_bound(field, value);
        }
    }

    if let Some(enforce) = dto.enforce_individual_uniques {
        format = format.with_individual_uniques(enforce);
    }
    if let Some(mandatory) = dto.hero_mandatory {
        format = format.with_hero_mandatory(mandatory);
    }
    if let Some(counts) = dto.count_hero_in_total {
        format = format.with_hero_in_total(counts);
    }

    for (j, ban) in dto.unban.iter().enumerate() {
        let ban = convert_ban(ban, &format!("format `{}` unban[{j}]", dto.name))?;
        format = format.without_ban(&ban);
    }
    for (j, ban) in dto.banned.iter().enumerate() {
        let ban = convert_ban(ban, &format!("format `{}` banned[{j}]", dto.name))?;
        format = format.with_ban(ban);
    }

    Ok(format)
}

fn convert_ban(dto: &BannedCardDto, context: &str) -> Result<BannedCard, LoadError> {
    let family = CardFamily::new(&dto.family).map_err(|e| LoadError::Family {
        context: context.to_string(),
        source: e,
    })?;
    let faction = dto
        .faction
        .parse::<Faction>()
        .map_err(|_| LoadError::UnknownFaction {
            context: context.to_string(),
            value: dto.faction.clone(),
        })?;
    Ok(BannedCard::new(family, faction))
}
