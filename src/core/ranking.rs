use crate::models::{ResolvedStore, ResolvedStoreList};
use std::cmp::Ordering;

/// Default number of stores returned to the customer
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Rank stores by distance and cap the list at `max_results`
///
/// Stores with a known distance are stable-sorted ascending, so ties keep
/// their join order. Stores without a distance are only returned when no
/// store could be placed, in their original order.
pub fn rank_stores(stores: Vec<ResolvedStore>, max_results: usize) -> ResolvedStoreList {
    let max_results = max_results.max(1);

    let (mut known, unknown): (Vec<_>, Vec<_>) = stores
        .into_iter()
        .partition(|s| s.distance_miles.is_some());

    if known.is_empty() {
        let mut fallback = unknown;
        fallback.truncate(max_results);
        return ResolvedStoreList {
            stores: fallback,
            ranked: false,
        };
    }

    known.sort_by(|a, b| compare_distance(a.distance_miles, b.distance_miles));
    known.truncate(max_results);

    ResolvedStoreList {
        stores: known,
        ranked: true,
    }
}

#[inline]
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
