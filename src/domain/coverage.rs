// Coverage domain models
use crate::domain::area::{AreaKind, DailyRecord};
use crate::domain::error::SelectionError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which cumulative counter a coverage figure is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoseSelector {
    /// People with at least one dose.
    Partial,
    /// People fully vaccinated.
    Full,
}

impl DoseSelector {
    pub fn count(&self, record: &DailyRecord) -> Option<u64> {
        match self {
            DoseSelector::Partial => record.dose_one,
            DoseSelector::Full => record.dose_complete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DoseSelector::Partial => "partial",
            DoseSelector::Full => "full",
        }
    }
}

impl FromStr for DoseSelector {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one" | "one dose" | "partial" => Ok(DoseSelector::Partial),
            "fully" | "fully vaccinated" | "full" => Ok(DoseSelector::Full),
            _ => Err(SelectionError::UnknownDose(s.to_string())),
        }
    }
}

impl fmt::Display for DoseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoverageResult {
    Percentage(f64),
    NoData,
}

impl CoverageResult {
    /// Positive percentages only; zero and missing data both yield `None`.
    pub fn positive(&self) -> Option<f64> {
        match *self {
            CoverageResult::Percentage(p) if p > 0.0 => Some(p),
            _ => None,
        }
    }
}

/// A validated request: target date, dose selector and which kind of area to map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub date: NaiveDate,
    pub dose: DoseSelector,
    pub kind: AreaKind,
}

impl Selection {
    pub fn new(date: NaiveDate, dose: DoseSelector, kind: AreaKind) -> Self {
        Self { date, dose, kind }
    }
}

/// Valid/invalid buckets keyed by canonical area code.
///
/// The two buckets never share a key: inserting into one removes the code from
/// the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageMap {
    pub valid: BTreeMap<String, f64>,
    pub invalid: BTreeMap<String, f64>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_valid(&mut self, code: String, percentage: f64) {
        self.invalid.remove(&code);
        self.valid.insert(code, percentage);
    }

    pub fn insert_invalid(&mut self, code: String) {
        self.valid.remove(&code);
        self.invalid.insert(code, 0.0);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.valid.contains_key(code) || self.invalid.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn retain_codes(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.valid.retain(|code, _| keep(code));
        self.invalid.retain(|code, _| keep(code));
    }

    pub fn is_disjoint(&self) -> bool {
        self.valid.keys().all(|code| !self.invalid.contains_key(code))
    }
}

/// Pipeline output handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub date: String,
    pub dose: String,
    pub kind: String,
    #[serde(flatten)]
    pub map: CoverageMap,
}

impl CoverageReport {
    pub fn new(selection: &Selection, map: CoverageMap) -> Self {
        Self {
            date: selection.date.format("%Y-%m-%d").to_string(),
            dose: selection.dose.as_str().to_string(),
            kind: selection.kind.as_str().to_string(),
            map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dose_selector_aliases() {
        for input in ["one", "ONE", "one dose", "partial"] {
            assert_eq!(input.parse::<DoseSelector>(), Ok(DoseSelector::Partial));
        }
        for input in ["fully", "Fully Vaccinated", "full"] {
            assert_eq!(input.parse::<DoseSelector>(), Ok(DoseSelector::Full));
        }
        assert_eq!(
            "two".parse::<DoseSelector>(),
            Err(SelectionError::UnknownDose("two".to_string()))
        );
    }

    #[test]
    fn test_dose_selector_reads_counter() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let record = DailyRecord::new(date, Some(5), None);
        assert_eq!(DoseSelector::Partial.count(&record), Some(5));
        assert_eq!(DoseSelector::Full.count(&record), None);
    }

    #[test]
    fn test_positive() {
        assert_eq!(CoverageResult::Percentage(12.5).positive(), Some(12.5));
        assert_eq!(CoverageResult::Percentage(0.0).positive(), None);
        assert_eq!(CoverageResult::NoData.positive(), None);
    }

    #[test]
    fn test_buckets_stay_disjoint() {
        let mut map = CoverageMap::new();
        map.insert_valid("FRA".to_string(), 20.0);
        map.insert_invalid("FRA".to_string());
        assert!(map.is_disjoint());
        assert_eq!(map.invalid.get("FRA"), Some(&0.0));
        assert!(!map.valid.contains_key("FRA"));

        map.insert_valid("FRA".to_string(), 21.0);
        assert!(map.is_disjoint());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_report_serializes_flat() {
        let selection = Selection::new(
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            DoseSelector::Partial,
            AreaKind::Country,
        );
        let mut map = CoverageMap::new();
        map.insert_valid("de".to_string(), 10.0);
        map.insert_invalid("fr".to_string());

        let json = serde_json::to_string(&CoverageReport::new(&selection, map)).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2021-03-01","dose":"partial","kind":"country","valid":{"de":10.0},"invalid":{"fr":0.0}}"#
        );
    }
}
