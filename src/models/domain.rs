use serde::{Deserialize, Serialize};

/// Shopify location identifier
pub type LocationId = u64;

/// Shopify inventory item identifier (distinct from the variant id)
pub type InventoryItemId = u64;

/// Stock held for one variant at one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(rename = "locationId")]
    pub location_id: LocationId,
    pub available: u64,
}

impl InventoryRecord {
    pub fn new(location_id: LocationId, available: u64) -> Self {
        Self { location_id, available }
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        self.available > 0
    }
}

/// Store or warehouse entry from the location directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: LocationId,
    pub name: String,
    #[serde(rename = "addressLine")]
    pub address_line: String,
    pub city: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A resolved latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Build a coordinate, rejecting values outside [-90,90] / [-180,180]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if crate::core::distance::is_valid_coordinate(latitude, longitude) {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }
}

/// In-stock location after the inventory/location join
#[derive(Debug, Clone, PartialEq)]
pub struct StockedLocation {
    pub location: LocationRecord,
    pub available: u64,
}

/// A store surfaced to the customer
///
/// `available` is always positive and `distance_miles` is only set when both
/// the customer and this store were geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStore {
    pub name: String,
    #[serde(rename = "addressLine")]
    pub address_line: String,
    pub city: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub phone: Option<String>,
    pub available: u64,
    #[serde(rename = "distanceMiles")]
    pub distance_miles: Option<f64>,
}

impl ResolvedStore {
    pub fn from_stocked(stocked: StockedLocation, distance_miles: Option<f64>) -> Self {
        let StockedLocation { location, available } = stocked;
        Self {
            name: location.name,
            address_line: location.address_line,
            city: location.city,
            postal_code: location.postal_code,
            phone: location.phone.filter(|p| !p.trim().is_empty()),
            available,
            distance_miles,
        }
    }
}

/// Ranked stores returned for a successful lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStoreList {
    pub stores: Vec<ResolvedStore>,
    /// True when the list is ordered by distance, false for the
    /// unknown-distance fallback
    pub ranked: bool,
}

impl ResolvedStoreList {
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub enum StockOutcome {
    /// At least one qualifying store holds stock
    Stores(ResolvedStoreList),
    /// No location holds any stock
    OutOfStock,
    /// Stock exists, but only at excluded locations
    NoQualifyingStore,
}

impl StockOutcome {
    pub fn stores(&self) -> &[ResolvedStore] {
        match self {
            StockOutcome::Stores(list) => &list.stores,
            _ => &[],
        }
    }
}
