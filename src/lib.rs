//! Stock Locator - nearby in-stock store lookup for storefront product pages
//!
//! This library resolves a product variant and a customer postcode to the
//! closest physical stores holding stock. Inventory comes from the Shopify
//! Admin API, coordinates from postcodes.io.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, LocationMatcher, ResolveError, ResolveOptions, StockResolver};
pub use models::{GeoCoordinate, InventoryRecord, LocationRecord, ResolvedStore, ResolvedStoreList, StockOutcome};
pub use services::{Geocoder, InventoryPlatform, UpstreamError};
