// Domain errors
use chrono::NaiveDate;
use thiserror::Error;

/// Data-quality problems found while building an area from the source dataset.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("area {area} has no population figure")]
    MissingPopulation { area: String },

    #[error("area {area} has non-positive population {population}")]
    NonPositivePopulation { area: String, population: f64 },
}

/// Rejected user selections. Raised before any resolution starts.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("malformed date '{0}', expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("date {date} is outside the available range {earliest}..={latest}")]
    DateOutOfRange {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("unknown dose type '{0}', expected one of: one, one dose, fully, fully vaccinated")]
    UnknownDose(String),

    #[error("unknown area kind '{0}', expected country or continent")]
    UnknownAreaKind(String),
}
