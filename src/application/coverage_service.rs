// Coverage service - Use case for building coverage maps
use crate::application::classifier::classify_areas;
use crate::application::completer::complete_map;
use crate::application::dataset_repository::DatasetRepository;
use crate::domain::area::{AreaKind, AreaTimeSeries};
use crate::domain::coverage::{CoverageReport, DoseSelector, Selection};
use crate::domain::error::SelectionError;
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything one run needs, loaded once up front.
#[derive(Debug)]
struct Dataset {
    areas: Vec<AreaTimeSeries>,
    code_table: HashMap<String, String>,
    canonical_codes: Vec<String>,
    latest_date: NaiveDate,
}

#[derive(Clone)]
pub struct CoverageService {
    dataset: Arc<Dataset>,
    earliest_date: NaiveDate,
}

impl CoverageService {
    pub async fn load(
        repository: Arc<dyn DatasetRepository>,
        reference_area: &str,
        earliest_date: NaiveDate,
    ) -> anyhow::Result<Self> {
        let areas = repository.load_areas().await.context("Failed to load areas")?;
        let code_table = repository
            .load_code_table()
            .await
            .context("Failed to load map code table")?;
        let canonical_codes = repository
            .load_canonical_codes()
            .await
            .context("Failed to load canonical map codes")?;

        let latest_date = latest_date(&areas, reference_area)
            .context("Dataset contains no dated records")?;

        tracing::info!(
            "Loaded {} areas, {} map codes, latest date {}",
            areas.len(),
            canonical_codes.len(),
            latest_date
        );

        Ok(Self {
            dataset: Arc::new(Dataset {
                areas,
                code_table,
                canonical_codes,
                latest_date,
            }),
            earliest_date,
        })
    }

    pub fn latest_date(&self) -> NaiveDate {
        self.dataset.latest_date
    }

    pub fn earliest_date(&self) -> NaiveDate {
        self.earliest_date
    }

    /// Validates raw user input against the dataset's date range.
    pub fn select(&self, date: &str, dose: &str, kind: &str) -> Result<Selection, SelectionError> {
        parse_selection(date, dose, kind, self.earliest_date, self.latest_date())
    }

    /// Runs resolution, classification and completion for one selection.
    pub fn coverage(&self, selection: &Selection) -> CoverageReport {
        let classified = classify_areas(
            &self.dataset.areas,
            &self.dataset.code_table,
            selection,
        );
        let map = complete_map(classified, &self.dataset.canonical_codes);

        tracing::info!(
            "Coverage for {} ({}, {}): {} with data, {} without",
            selection.date,
            selection.dose,
            selection.kind,
            map.valid.len(),
            map.invalid.len()
        );

        CoverageReport::new(selection, map)
    }
}

/// Last date of the reference area, or the latest date of any area when the
/// reference is missing from the dataset.
fn latest_date(areas: &[AreaTimeSeries], reference_area: &str) -> Option<NaiveDate> {
    let reference = areas
        .iter()
        .find(|ts| ts.area().source_id == reference_area)
        .and_then(AreaTimeSeries::last_date);

    match reference {
        Some(date) => Some(date),
        None => {
            tracing::warn!(
                "Reference area {} has no records, using the latest date of any area",
                reference_area
            );
            areas.iter().filter_map(AreaTimeSeries::last_date).max()
        }
    }
}

pub fn parse_selection(
    date: &str,
    dose: &str,
    kind: &str,
    earliest: NaiveDate,
    latest: NaiveDate,
) -> Result<Selection, SelectionError> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| SelectionError::MalformedDate(date.to_string()))?;

    if parsed < earliest || parsed > latest {
        return Err(SelectionError::DateOutOfRange {
            date: parsed,
            earliest,
            latest,
        });
    }

    let dose: DoseSelector = dose.parse()?;
    let kind: AreaKind = kind.parse()?;

    Ok(Selection::new(parsed, dose, kind))
}
