// Coverage resolver - percentage of one area's population covered on a date
use crate::domain::area::AreaTimeSeries;
use crate::domain::coverage::{CoverageResult, DoseSelector};
use chrono::NaiveDate;

/// Longest observed gap between two vaccination reports in the source dataset.
pub const LOOKBACK_DAYS: u64 = 21;

/// Resolves coverage for `series` on `date`.
///
/// The target day must exist in the series. When it carries no cumulative
/// counters, the nearest earlier day within [`LOOKBACK_DAYS`] that does is used
/// instead. A missing counter on a reporting day counts as zero.
pub fn resolve_coverage(
    series: &AreaTimeSeries,
    date: NaiveDate,
    dose: DoseSelector,
) -> CoverageResult {
    let Some(target) = series.record_on(date) else {
        return CoverageResult::NoData;
    };

    let reporting_day = if target.totals_reported() {
        Some(target)
    } else {
        series
            .prior_records(date, LOOKBACK_DAYS)
            .find(|record| record.totals_reported())
    };

    match reporting_day {
        Some(record) => {
            let count = dose.count(record).unwrap_or(0);
            CoverageResult::Percentage(percentage(count, series.area().population))
        }
        None => CoverageResult::NoData,
    }
}

/// `count / population * 100` rounded half away from zero to two decimals.
pub fn percentage(count: u64, population: u64) -> f64 {
    let raw = count as f64 / population as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
