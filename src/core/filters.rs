use crate::models::{InventoryRecord, LocationId, LocationRecord, StockedLocation};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

type LocationPredicate = dyn Fn(&LocationRecord) -> bool + Send + Sync;

/// Predicate identifying locations that must never be shown to customers
///
/// Used for the fulfillment-only warehouse: its stock counts towards nothing
/// customer-facing and it is never geocoded.
#[derive(Clone)]
pub struct LocationMatcher {
    predicate: Arc<LocationPredicate>,
    description: String,
}

impl LocationMatcher {
    /// Matcher that excludes nothing
    pub fn none() -> Self {
        Self {
            predicate: Arc::new(|_| false),
            description: "none".to_string(),
        }
    }

    pub fn from_fn<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&LocationRecord) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }

    /// Case-insensitive substring match against the location name or address line
    pub fn name_or_address_contains<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        if patterns.is_empty() {
            return Self::none();
        }

        let description = format!("name or address contains {:?}", patterns);
        Self::from_fn(description, move |location| {
            let name = location.name.to_lowercase();
            let address = location.address_line.to_lowercase();
            patterns
                .iter()
                .any(|p| name.contains(p.as_str()) || address.contains(p.as_str()))
        })
    }

    #[inline]
    pub fn matches(&self, location: &LocationRecord) -> bool {
        (self.predicate)(location)
    }
}

impl Default for LocationMatcher {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for LocationMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationMatcher")
            .field("description", &self.description)
            .finish()
    }
}

/// Keep only inventory records with positive stock
///
/// Stage 1 of the resolution pipeline.
pub fn retain_in_stock(records: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
    records.into_iter().filter(InventoryRecord::in_stock).collect()
}

/// Distinct location ids in first-seen order
pub fn distinct_location_ids(records: &[InventoryRecord]) -> Vec<LocationId> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(|r| r.location_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Join stock with the location directory, preserving inventory order
///
/// Inventory for a location missing from the directory is dropped.
pub fn join_locations(
    stock: Vec<InventoryRecord>,
    locations: Vec<LocationRecord>,
) -> Vec<StockedLocation> {
    let directory: HashMap<LocationId, LocationRecord> =
        locations.into_iter().map(|l| (l.id, l)).collect();

    stock
        .into_iter()
        .filter_map(|record| match directory.get(&record.location_id) {
            Some(location) => Some(StockedLocation {
                location: location.clone(),
                available: record.available,
            }),
            None => {
                tracing::debug!("Location {} not in directory, dropping", record.location_id);
                None
            }
        })
        .collect()
}

/// Remove locations matched by the exclusion predicate
pub fn exclude_locations(
    stocked: Vec<StockedLocation>,
    matcher: &LocationMatcher,
) -> Vec<StockedLocation> {
    stocked
        .into_iter()
        .filter(|s| {
            let excluded = matcher.matches(&s.location);
            if excluded {
                tracing::info!("Skipping excluded location: {}", s.location.name);
            }
            !excluded
        })
        .collect()
}
