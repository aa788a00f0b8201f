// Area domain model - one reporting unit and its daily vaccination history
use crate::domain::error::{DataError, SelectionError};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prefix the source dataset uses for continents and other aggregates.
const AGGREGATE_PREFIX: &str = "OWID_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Country,
    Continent,
}

impl AreaKind {
    pub fn from_source_id(source_id: &str) -> Self {
        if source_id.starts_with(AGGREGATE_PREFIX) {
            AreaKind::Continent
        } else {
            AreaKind::Country
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Country => "country",
            AreaKind::Continent => "continent",
        }
    }
}

impl FromStr for AreaKind {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "country" | "countries" => Ok(AreaKind::Country),
            "continent" | "continents" => Ok(AreaKind::Continent),
            _ => Err(SelectionError::UnknownAreaKind(s.to_string())),
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub source_id: String,
    pub kind: AreaKind,
    pub population: u64,
}

impl Area {
    /// Builds an area, rejecting missing or non-positive populations.
    pub fn new(source_id: String, population: Option<f64>) -> Result<Self, DataError> {
        let population = match population {
            Some(p) if p.is_finite() && p >= 1.0 => p.round() as u64,
            Some(p) => {
                return Err(DataError::NonPositivePopulation {
                    area: source_id,
                    population: p,
                });
            }
            None => return Err(DataError::MissingPopulation { area: source_id }),
        };
        let kind = AreaKind::from_source_id(&source_id);

        Ok(Self {
            source_id,
            kind,
            population,
        })
    }
}

/// Cumulative counters reported for one area on one day. Any of them may be
/// missing even though the day itself is present.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub dose_one: Option<u64>,
    pub dose_complete: Option<u64>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, dose_one: Option<u64>, dose_complete: Option<u64>) -> Self {
        Self {
            date,
            dose_one,
            dose_complete,
        }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, None, None)
    }

    /// True when the day carries at least one cumulative person counter.
    pub fn totals_reported(&self) -> bool {
        self.dose_one.is_some() || self.dose_complete.is_some()
    }
}

/// Daily records of one area keyed by calendar date.
#[derive(Debug, Clone)]
pub struct AreaTimeSeries {
    area: Area,
    records: BTreeMap<NaiveDate, DailyRecord>,
}

impl AreaTimeSeries {
    /// Records may arrive in any order; a repeated date keeps the last one.
    pub fn new(area: Area, records: impl IntoIterator<Item = DailyRecord>) -> Self {
        let mut by_date = BTreeMap::new();
        for record in records {
            if let Some(previous) = by_date.insert(record.date, record) {
                tracing::debug!(
                    "Duplicate record for {} on {}, keeping the later entry",
                    area.source_id,
                    previous.date
                );
            }
        }

        Self {
            area,
            records: by_date,
        }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_on(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.get(&date)
    }

    /// Records from the day before `from` walking backward, limited to the
    /// `max_days` calendar days preceding `from`.
    pub fn prior_records(
        &self,
        from: NaiveDate,
        max_days: u64,
    ) -> impl Iterator<Item = &DailyRecord> + '_ {
        let window = match from.checked_sub_days(Days::new(max_days)) {
            Some(start) => self.records.range(start..from),
            None => self.records.range(..from),
        };
        window.rev().map(|(_, record)| record)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    fn series(records: Vec<DailyRecord>) -> AreaTimeSeries {
        let area = Area::new("DEU".to_string(), Some(83_000_000.0)).unwrap();
        AreaTimeSeries::new(area, records)
    }

    #[test]
    fn test_area_kind_from_source_id() {
        assert_eq!(AreaKind::from_source_id("DEU"), AreaKind::Country);
        assert_eq!(AreaKind::from_source_id("OWID_EUR"), AreaKind::Continent);
    }

    #[test]
    fn test_area_kind_parse() {
        assert_eq!("Country".parse::<AreaKind>(), Ok(AreaKind::Country));
        assert_eq!(" continent ".parse::<AreaKind>(), Ok(AreaKind::Continent));
        assert_eq!(
            "planet".parse::<AreaKind>(),
            Err(SelectionError::UnknownAreaKind("planet".to_string()))
        );
    }

    #[test]
    fn test_area_rejects_bad_population() {
        assert_eq!(
            Area::new("XYZ".to_string(), Some(0.0)),
            Err(DataError::NonPositivePopulation {
                area: "XYZ".to_string(),
                population: 0.0
            })
        );
        assert!(Area::new("XYZ".to_string(), Some(-5.0)).is_err());
        assert!(Area::new("XYZ".to_string(), Some(f64::NAN)).is_err());
        assert_eq!(
            Area::new("XYZ".to_string(), None),
            Err(DataError::MissingPopulation {
                area: "XYZ".to_string()
            })
        );
    }

    #[test]
    fn test_area_accepts_fractional_population() {
        let area = Area::new("OWID_EUR".to_string(), Some(748_962_983.0)).unwrap();
        assert_eq!(area.population, 748_962_983);
        assert_eq!(area.kind, AreaKind::Continent);
    }

    #[test]
    fn test_record_on_is_exact() {
        let ts = series(vec![DailyRecord::new(day(1), Some(10), None)]);
        assert!(ts.record_on(day(1)).is_some());
        assert!(ts.record_on(day(2)).is_none());
    }

    #[test]
    fn test_ordering_is_normalized() {
        let ts = series(vec![
            DailyRecord::empty(day(9)),
            DailyRecord::empty(day(3)),
            DailyRecord::empty(day(6)),
        ]);
        assert_eq!(ts.last_date(), Some(day(9)));

        let prior: Vec<NaiveDate> = ts.prior_records(day(10), 21).map(|r| r.date).collect();
        assert_eq!(prior, vec![day(9), day(6), day(3)]);
    }

    #[test]
    fn test_prior_records_window() {
        let ts = series((1..=20).map(|d| DailyRecord::empty(day(d))).collect());

        let prior: Vec<NaiveDate> = ts.prior_records(day(10), 3).map(|r| r.date).collect();
        assert_eq!(prior, vec![day(9), day(8), day(7)]);

        // Stops at the start of history.
        let prior: Vec<NaiveDate> = ts.prior_records(day(3), 21).map(|r| r.date).collect();
        assert_eq!(prior, vec![day(2), day(1)]);
    }

    #[test]
    fn test_prior_records_counts_calendar_days_not_entries() {
        let ts = series(vec![DailyRecord::empty(day(1)), DailyRecord::empty(day(9))]);
        let prior: Vec<NaiveDate> = ts.prior_records(day(10), 5).map(|r| r.date).collect();
        assert_eq!(prior, vec![day(9)]);
    }

    #[test]
    fn test_duplicate_date_keeps_last() {
        let ts = series(vec![
            DailyRecord::new(day(1), Some(1), None),
            DailyRecord::new(day(1), Some(2), None),
        ]);
        assert_eq!(ts.len(), 1);
        assert_eq!(ts.record_on(day(1)).unwrap().dose_one, Some(2));
    }

    #[test]
    fn test_totals_reported() {
        assert!(!DailyRecord::empty(day(1)).totals_reported());
        assert!(DailyRecord::new(day(1), None, Some(3)).totals_reported());
    }
}
