// Service exports
pub mod postcodes;
pub mod shopify;

pub use postcodes::{normalize_postcode, GeocodeError, PostcodesClient};
pub use shopify::{ShopifyClient, ShopifyError};

use crate::models::{GeoCoordinate, InventoryItemId, InventoryRecord, LocationId, LocationRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to an external collaborator
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} unavailable: {message}")]
    Unavailable { service: &'static str, message: String },

    #[error("{service} returned a malformed response: {message}")]
    Malformed { service: &'static str, message: String },
}

/// Inventory platform holding variants, stock levels and store locations
#[async_trait]
pub trait InventoryPlatform: Send + Sync {
    /// Resolve a variant to its inventory item id
    ///
    /// Returns `Ok(None)` if the variant does not exist or is not inventory-tracked.
    async fn inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<InventoryItemId>, UpstreamError>;

    /// Stock levels for an inventory item at every location
    async fn inventory_levels(
        &self,
        item_id: InventoryItemId,
    ) -> Result<Vec<InventoryRecord>, UpstreamError>;

    /// Directory entries for the given locations
    async fn locations(&self, ids: &[LocationId]) -> Result<Vec<LocationRecord>, UpstreamError>;
}

/// Postal code geocoding service
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `Ok(None)` when the service does not recognise the postal code.
    async fn geocode(&self, postal_code: &str) -> Result<Option<GeoCoordinate>, UpstreamError>;
}
