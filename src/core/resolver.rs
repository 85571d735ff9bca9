use crate::core::{
    distance::distance_between,
    filters::{distinct_location_ids, exclude_locations, join_locations, retain_in_stock, LocationMatcher},
    ranking::{rank_stores, DEFAULT_MAX_RESULTS},
};
use crate::models::{GeoCoordinate, ResolvedStore, StockOutcome, StockedLocation};
use crate::services::{Geocoder, InventoryPlatform, UpstreamError};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

/// Errors that end a resolution without a result
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    #[error("Postcode could not be geocoded: {0}")]
    InvalidPostcode(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),
}

/// Per-resolution options
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Locations never shown to customers (the fulfillment warehouse)
    pub exclude: LocationMatcher,
    /// Maximum number of stores returned, at least 1
    pub max_results: usize,
}

impl ResolveOptions {
    pub fn new(exclude: LocationMatcher, max_results: usize) -> Self {
        Self {
            exclude,
            max_results: max_results.max(1),
        }
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::new(LocationMatcher::none(), DEFAULT_MAX_RESULTS)
    }
}

/// Resolves a variant and customer postcode to nearby in-stock stores
///
/// # Pipeline Stages
/// 1. Variant to inventory item
/// 2. Inventory levels, zero stock dropped
/// 3. Location lookup and join
/// 4. Warehouse exclusion
/// 5. Customer and store geocoding
/// 6. Distance ranking
///
/// Holds no per-request state and can be shared across handlers.
#[derive(Clone)]
pub struct StockResolver {
    inventory: Arc<dyn InventoryPlatform>,
    geocoder: Arc<dyn Geocoder>,
    options: ResolveOptions,
    geocoding_concurrency: usize,
}

/// Store geocodes in flight at once unless configured otherwise
pub const DEFAULT_GEOCODING_CONCURRENCY: usize = 8;

impl StockResolver {
    pub fn new(
        inventory: Arc<dyn InventoryPlatform>,
        geocoder: Arc<dyn Geocoder>,
        options: ResolveOptions,
    ) -> Self {
        Self {
            inventory,
            geocoder,
            options,
            geocoding_concurrency: DEFAULT_GEOCODING_CONCURRENCY,
        }
    }

    /// Cap on concurrent store geocodes; 1 geocodes stores one at a time
    pub fn with_geocoding_concurrency(mut self, limit: usize) -> Self {
        self.geocoding_concurrency = limit.max(1);
        self
    }

    /// Resolve using the options the resolver was built with
    pub async fn resolve(
        &self,
        variant_id: &str,
        customer_postcode: &str,
    ) -> Result<StockOutcome, ResolveError> {
        self.resolve_with(variant_id, customer_postcode, &self.options).await
    }

    /// Resolve with explicit options
    pub async fn resolve_with(
        &self,
        variant_id: &str,
        customer_postcode: &str,
        options: &ResolveOptions,
    ) -> Result<StockOutcome, ResolveError> {
        let variant_id = variant_id.trim();
        let customer_postcode = customer_postcode.trim();

        if variant_id.is_empty() {
            return Err(ResolveError::InvalidRequest("variant id is required".into()));
        }
        if customer_postcode.is_empty() {
            return Err(ResolveError::InvalidRequest("postcode is required".into()));
        }

        // Stage 1: variant to inventory item
        let item_id = self
            .inventory
            .inventory_item_id(variant_id)
            .await?
            .ok_or_else(|| ResolveError::VariantNotFound(variant_id.to_string()))?;

        tracing::debug!("Variant {} tracks inventory item {}", variant_id, item_id);

        // Stage 2: stock levels, zero stock never counts
        let levels = self.inventory.inventory_levels(item_id).await?;
        let in_stock = retain_in_stock(levels);

        tracing::debug!("{} locations with stock for item {}", in_stock.len(), item_id);

        if in_stock.is_empty() {
            return Ok(StockOutcome::OutOfStock);
        }

        // Stage 3: location directory join
        let ids = distinct_location_ids(&in_stock);
        let locations = self.inventory.locations(&ids).await?;
        let joined = join_locations(in_stock, locations);

        // Stage 4: warehouse exclusion, before any geocoding
        let candidates = exclude_locations(joined, &options.exclude);
        if candidates.is_empty() {
            return Ok(StockOutcome::NoQualifyingStore);
        }

        // Stage 5: geocoding
        let customer = match self.geocoder.geocode(customer_postcode).await {
            Ok(Some(coords)) => coords,
            Ok(None) => {
                return Err(ResolveError::InvalidPostcode(customer_postcode.to_string()));
            }
            Err(e) => {
                tracing::warn!("Customer geocoding failed for {}: {}", customer_postcode, e);
                return Err(ResolveError::InvalidPostcode(customer_postcode.to_string()));
            }
        };

        tracing::debug!("Customer coordinates: {:?}", customer);

        let stores = self.measure_stores(&customer, candidates).await;

        // Stage 6: ranking
        let ranked = rank_stores(stores, options.max_results);

        tracing::info!(
            "Resolved {} stores for variant {} (ranked: {})",
            ranked.len(),
            variant_id,
            ranked.ranked
        );

        Ok(StockOutcome::Stores(ranked))
    }

    /// Attach a distance to every candidate, keeping join order
    async fn measure_stores(
        &self,
        customer: &GeoCoordinate,
        candidates: Vec<StockedLocation>,
    ) -> Vec<ResolvedStore> {
        // buffered keeps input order regardless of completion order
        let coords: Vec<Option<GeoCoordinate>> = stream::iter(candidates.iter())
            .map(|c| self.geocode_store(c))
            .buffered(self.geocoding_concurrency)
            .collect()
            .await;

        candidates
            .into_iter()
            .zip(coords)
            .map(|(candidate, store_coords)| {
                let distance = store_coords.map(|c| distance_between(customer, &c));
                ResolvedStore::from_stocked(candidate, distance)
            })
            .collect()
    }

    async fn geocode_store(&self, candidate: &StockedLocation) -> Option<GeoCoordinate> {
        let postal_code = candidate.location.postal_code.trim();
        if postal_code.is_empty() {
            return None;
        }

        match self.geocoder.geocode(postal_code).await {
            Ok(coords) => {
                if coords.is_none() {
                    tracing::warn!(
                        "Store {} postcode {} did not resolve",
                        candidate.location.name,
                        postal_code
                    );
                }
                coords
            }
            Err(e) => {
                tracing::warn!("Geocoding failed for store {}: {}", candidate.location.name, e);
                None
            }
        }
    }
}
