// Coverage-map completer - makes the map cover exactly the drawable areas
use crate::domain::coverage::CoverageMap;
use std::collections::HashSet;

/// Adds every canonical code missing from both buckets to `invalid` with 0.
///
/// Existing entries are kept as they are. Codes the renderer cannot draw are
/// dropped, so afterwards the buckets cover `canonical_codes` exactly.
pub fn complete_map(mut map: CoverageMap, canonical_codes: &[String]) -> CoverageMap {
    let canonical: HashSet<&str> = canonical_codes.iter().map(String::as_str).collect();

    let before = map.len();
    map.retain_codes(|code| canonical.contains(code));
    let dropped = before - map.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} areas the map cannot draw", dropped);
    }

    let mut filled = 0;
    for code in canonical_codes {
        if !map.contains(code) {
            map.insert_invalid(code.clone());
            filled += 1;
        }
    }
    tracing::debug!("Filled {} map holes", filled);

    map
}
