// Area classifier - buckets every mappable area into valid or invalid
use crate::application::resolver::resolve_coverage;
use crate::domain::area::AreaTimeSeries;
use crate::domain::coverage::{CoverageMap, CoverageResult, Selection};
use rayon::prelude::*;
use std::collections::HashMap;

/// Resolves each area of the selected kind and splits the results.
///
/// Areas with a positive percentage land in `valid`. Zero and "no data" are
/// merged into `invalid` with value 0, matching the map's two-entry legend.
/// Areas missing from `code_table` are not drawable and are skipped.
pub fn classify_areas(
    series: &[AreaTimeSeries],
    code_table: &HashMap<String, String>,
    selection: &Selection,
) -> CoverageMap {
    let resolved: Vec<(&str, &str, CoverageResult)> = series
        .par_iter()
        .filter(|ts| ts.area().kind == selection.kind)
        .filter_map(|ts| {
            let source_id = ts.area().source_id.as_str();
            let Some(code) = code_table.get(source_id) else {
                tracing::debug!("No map code for {}, skipping", source_id);
                return None;
            };
            let result = resolve_coverage(ts, selection.date, selection.dose);
            Some((source_id, code.as_str(), result))
        })
        .collect();

    let mut map = CoverageMap::new();
    for (source_id, code, result) in resolved {
        if map.contains(code) {
            tracing::warn!(
                "Map code {} is shared by several areas, {} overrides the earlier value",
                code,
                source_id
            );
        }
        match result.positive() {
            Some(percentage) => map.insert_valid(code.to_string(), percentage),
            None => map.insert_invalid(code.to_string()),
        }
    }

    tracing::debug!(
        "Classified {} valid and {} invalid areas",
        map.valid.len(),
        map.invalid.len()
    );
    map
}
