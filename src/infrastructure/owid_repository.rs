// File-backed repository for the Our World in Data vaccination dataset
use crate::application::dataset_repository::DatasetRepository;
use crate::domain::area::{Area, AreaTimeSeries, DailyRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct OwidFileRepository {
    dataset_path: PathBuf,
    code_table_path: PathBuf,
    canonical_codes_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct OwidArea {
    #[serde(default)]
    population: Option<f64>,
    #[serde(default)]
    data: Vec<OwidDay>,
}

#[derive(Debug, Deserialize)]
struct OwidDay {
    date: String,
    #[serde(default)]
    people_vaccinated: Option<f64>,
    #[serde(default)]
    people_fully_vaccinated: Option<f64>,
}

impl OwidFileRepository {
    pub fn new(dataset_path: PathBuf, code_table_path: PathBuf, canonical_codes_path: PathBuf) -> Self {
        Self {
            dataset_path,
            code_table_path,
            canonical_codes_path,
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))
}

/// Parses the dataset JSON and builds one series per usable area.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<AreaTimeSeries>> {
    let raw: BTreeMap<String, OwidArea> =
        serde_json::from_slice(bytes).context("Failed to parse vaccination dataset")?;

    let mut areas = Vec::with_capacity(raw.len());
    for (source_id, owid_area) in raw {
        let area = match Area::new(source_id, owid_area.population) {
            Ok(area) => area,
            Err(e) => {
                tracing::warn!("Skipping area: {}", e);
                continue;
            }
        };

        let records: Vec<DailyRecord> = owid_area
            .data
            .into_iter()
            .filter_map(|day| to_record(&area.source_id, day))
            .collect();
        let series = AreaTimeSeries::new(area, records);
        if series.is_empty() {
            tracing::debug!("{} has no dated records", series.area().source_id);
        }
        areas.push(series);
    }

    let record_count: usize = areas.iter().map(AreaTimeSeries::len).sum();
    tracing::debug!("Parsed {} areas with {} daily records", areas.len(), record_count);

    Ok(areas)
}

fn to_record(source_id: &str, day: OwidDay) -> Option<DailyRecord> {
    let date = match NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            tracing::warn!("Skipping {} entry with malformed date '{}'", source_id, day.date);
            return None;
        }
    };

    Some(DailyRecord::new(
        date,
        to_count(day.people_vaccinated),
        to_count(day.people_fully_vaccinated),
    ))
}

/// Counters arrive as JSON numbers that may carry a fractional part.
fn to_count(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

pub fn parse_code_table(bytes: &[u8]) -> Result<HashMap<String, String>> {
    serde_json::from_slice(bytes).context("Failed to parse map code table")
}

/// One code per line; tolerates a UTF-8 byte order mark and blank lines.
pub fn parse_canonical_codes(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl DatasetRepository for OwidFileRepository {
    async fn load_areas(&self) -> Result<Vec<AreaTimeSeries>> {
        tracing::info!("Loading vaccination dataset from {:?}", self.dataset_path);
        let bytes = read_file(&self.dataset_path).await?;
        tokio::task::spawn_blocking(move || parse_dataset(&bytes))
            .await
            .context("Dataset parser task failed")?
    }

    async fn load_code_table(&self) -> Result<HashMap<String, String>> {
        let bytes = read_file(&self.code_table_path).await?;
        parse_code_table(&bytes)
    }

    async fn load_canonical_codes(&self) -> Result<Vec<String>> {
        let bytes = read_file(&self.canonical_codes_path).await?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{:?} is not valid UTF-8", self.canonical_codes_path))?;
        Ok(parse_canonical_codes(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::area::AreaKind;

    const DATASET: &str = r#"{
        "DEU": {
            "continent": "Europe",
            "location": "Germany",
            "population": 83000000.0,
            "data": [
                {"date": "2021-03-02", "new_cases": 10.0},
                {"date": "2021-03-01", "total_vaccinations": 9000000.0, "people_vaccinated": 8300000.0},
                {"date": "not-a-date", "people_vaccinated": 1.0}
            ]
        },
        "OWID_EUR": {
            "population": 748962983.0,
            "data": [{"date": "2021-03-01", "people_fully_vaccinated": 1000.0}]
        },
        "VAT": {
            "data": [{"date": "2021-03-01", "people_vaccinated": 10.0}]
        },
        "ZZZ": {
            "population": 0,
            "data": []
        }
    }"#;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    #[test]
    fn test_parse_dataset() {
        let areas = parse_dataset(DATASET.as_bytes()).unwrap();
        let ids: Vec<&str> = areas.iter().map(|a| a.area().source_id.as_str()).collect();
        assert_eq!(ids, vec!["DEU", "OWID_EUR"]);

        let deu = &areas[0];
        assert_eq!(deu.area().population, 83_000_000);
        assert_eq!(deu.len(), 2);
        assert_eq!(deu.last_date(), Some(date(2)));

        let day = deu.record_on(date(1)).unwrap();
        assert_eq!(day.dose_one, Some(8_300_000));
        assert_eq!(day.dose_complete, None);
        assert!(!deu.record_on(date(2)).unwrap().totals_reported());

        assert_eq!(areas[1].area().kind, AreaKind::Continent);
    }

    #[test]
    fn test_parse_dataset_rejects_garbage() {
        assert!(parse_dataset(b"[1, 2, 3]").is_err());
    }

    #[test]
    fn test_to_count() {
        assert_eq!(to_count(Some(12.0)), Some(12));
        assert_eq!(to_count(Some(-1.0)), None);
        assert_eq!(to_count(Some(f64::INFINITY)), None);
        assert_eq!(to_count(None), None);
    }

    #[test]
    fn test_parse_code_table() {
        let table = parse_code_table(br#"{"DEU": "de", "FRA": "fr"}"#).unwrap();
        assert_eq!(table.get("DEU").map(String::as_str), Some("de"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_canonical_codes() {
        let codes = parse_canonical_codes("\u{feff}ad\r\nae\n\n  af  \n");
        assert_eq!(codes, vec!["ad", "ae", "af"]);
    }

    #[tokio::test]
    async fn test_missing_files_are_errors() {
        let repo = OwidFileRepository::new(
            PathBuf::from("missing/dataset.json"),
            PathBuf::from("missing/codes.json"),
            PathBuf::from("missing/canonical.csv"),
        );
        assert!(repo.load_areas().await.is_err());
        assert!(repo.load_code_table().await.is_err());
        assert!(repo.load_canonical_codes().await.is_err());
    }
}
