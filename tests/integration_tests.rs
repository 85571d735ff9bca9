// Integration tests for the stock resolution pipeline

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stock_locator::core::{haversine_distance, LocationMatcher, ResolveError, ResolveOptions, StockResolver};
use stock_locator::models::{
    GeoCoordinate, InventoryItemId, InventoryRecord, LocationId, LocationRecord, StockOutcome,
};
use stock_locator::services::{Geocoder, InventoryPlatform, UpstreamError};

#[derive(Default)]
struct FakePlatform {
    item_id: Option<InventoryItemId>,
    levels: Vec<InventoryRecord>,
    locations: Vec<LocationRecord>,
    levels_unavailable: bool,
    requested_locations: Mutex<Vec<LocationId>>,
}

#[async_trait]
impl InventoryPlatform for FakePlatform {
    async fn inventory_item_id(
        &self,
        _variant_id: &str,
    ) -> Result<Option<InventoryItemId>, UpstreamError> {
        Ok(self.item_id)
    }

    async fn inventory_levels(
        &self,
        _item_id: InventoryItemId,
    ) -> Result<Vec<InventoryRecord>, UpstreamError> {
        if self.levels_unavailable {
            return Err(UpstreamError::Unavailable {
                service: "shopify",
                message: "connection reset".to_string(),
            });
        }
        Ok(self.levels.clone())
    }

    async fn locations(&self, ids: &[LocationId]) -> Result<Vec<LocationRecord>, UpstreamError> {
        self.requested_locations.lock().unwrap().extend_from_slice(ids);
        Ok(self
            .locations
            .iter()
            .filter(|l| ids.contains(&l.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeGeocoder {
    table: HashMap<String, GeoCoordinate>,
    broken: bool,
    outage: bool,
    lookups: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    fn with(entries: &[(&str, f64, f64)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(pc, lat, lon)| (pc.to_string(), GeoCoordinate { latitude: *lat, longitude: *lon }))
                .collect(),
            ..Default::default()
        }
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, postal_code: &str) -> Result<Option<GeoCoordinate>, UpstreamError> {
        self.lookups.lock().unwrap().push(postal_code.to_string());
        if self.outage || (self.broken && postal_code != CUSTOMER) {
            return Err(UpstreamError::Unavailable {
                service: "postcodes.io",
                message: "503".to_string(),
            });
        }
        Ok(self.table.get(postal_code).copied())
    }
}

const CUSTOMER: &str = "BN2 1TW";

fn location(id: LocationId, name: &str, address: &str, postal_code: &str) -> LocationRecord {
    LocationRecord {
        id,
        name: name.to_string(),
        address_line: address.to_string(),
        city: String::new(),
        postal_code: postal_code.to_string(),
        phone: None,
    }
}

fn warehouse_options() -> ResolveOptions {
    ResolveOptions::new(LocationMatcher::name_or_address_contains(["unit 22"]), 3)
}

fn resolver(platform: Arc<FakePlatform>, geocoder: Arc<FakeGeocoder>) -> StockResolver {
    StockResolver::new(platform, geocoder, warehouse_options())
}

#[tokio::test]
async fn test_brighton_in_stock_london_empty() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![InventoryRecord::new(1, 5), InventoryRecord::new(2, 0)],
        locations: vec![
            location(1, "Brighton", "7 Gardner Street", "BN1 1UP"),
            location(2, "London", "123 London St", "E1 6AN"),
        ],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder::with(&[
        (CUSTOMER, 50.8262, -0.1167),
        ("BN1 1UP", 50.8247, -0.1392),
        ("E1 6AN", 51.5226, -0.0746),
    ]));

    let outcome = resolver(platform.clone(), geocoder.clone())
        .resolve("4242", CUSTOMER)
        .await
        .unwrap();

    let stores = outcome.stores();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].name, "Brighton");
    assert_eq!(stores[0].available, 5);

    let expected = haversine_distance(50.8262, -0.1167, 50.8247, -0.1392);
    let distance = stores[0].distance_miles.expect("distance should be computed");
    assert!((distance - expected).abs() < 1e-9);

    // Zero-stock London is never looked up or geocoded
    assert_eq!(*platform.requested_locations.lock().unwrap(), vec![1]);
    assert!(!geocoder.lookups().contains(&"E1 6AN".to_string()));
}

#[tokio::test]
async fn test_all_zero_stock_is_out_of_stock() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![InventoryRecord::new(1, 0), InventoryRecord::new(2, 0)],
        locations: vec![location(1, "Brighton", "", "BN1 1UP")],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder::with(&[(CUSTOMER, 50.8262, -0.1167)]));

    let outcome = resolver(platform, geocoder.clone()).resolve("4242", CUSTOMER).await.unwrap();

    assert_eq!(outcome, StockOutcome::OutOfStock);
    assert!(geocoder.lookups().is_empty());
}

#[tokio::test]
async fn test_no_levels_is_out_of_stock() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        ..Default::default()
    });

    let outcome = resolver(platform, Arc::new(FakeGeocoder::default()))
        .resolve("4242", CUSTOMER)
        .await
        .unwrap();

    assert_eq!(outcome, StockOutcome::OutOfStock);
}

#[tokio::test]
async fn test_only_warehouse_stock_is_no_qualifying_store() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![InventoryRecord::new(1, 120), InventoryRecord::new(2, 0)],
        locations: vec![
            location(1, "Fulfilment Centre", "Unit 22, Valley Road", "BN9 0AA"),
            location(2, "Brighton", "7 Gardner Street", "BN1 1UP"),
        ],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder::with(&[(CUSTOMER, 50.8262, -0.1167)]));

    let outcome = resolver(platform, geocoder.clone()).resolve("4242", CUSTOMER).await.unwrap();

    assert_eq!(outcome, StockOutcome::NoQualifyingStore);
    // Exclusion happens before any geocoding
    assert!(geocoder.lookups().is_empty());
}

#[tokio::test]
async fn test_unknown_variant() {
    let platform = Arc::new(FakePlatform::default());

    let result = resolver(platform, Arc::new(FakeGeocoder::default()))
        .resolve("does-not-exist", CUSTOMER)
        .await;

    assert!(matches!(result, Err(ResolveError::VariantNotFound(id)) if id == "does-not-exist"));
}

#[tokio::test]
async fn test_unresolvable_customer_postcode() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![InventoryRecord::new(1, 5)],
        locations: vec![location(1, "Brighton", "", "BN1 1UP")],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder::with(&[("BN1 1UP", 50.8247, -0.1392)]));

    let result = resolver(platform, geocoder).resolve("4242", "NOT A POSTCODE").await;

    assert!(matches!(result, Err(ResolveError::InvalidPostcode(_))));
}

#[tokio::test]
async fn test_geocoder_outage_is_invalid_postcode() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![InventoryRecord::new(1, 5), InventoryRecord::new(2, 3)],
        locations: vec![
            location(1, "Brighton", "7 Gardner Street", "BN1 1UP"),
            location(2, "Bristol", "", "BS1 4DJ"),
        ],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder {
        outage: true,
        ..FakeGeocoder::with(&[(CUSTOMER, 50.8262, -0.1167), ("BN1 1UP", 50.8247, -0.1392)])
    });

    let result = resolver(platform, geocoder.clone()).resolve("4242", CUSTOMER).await;

    assert!(matches!(result, Err(ResolveError::InvalidPostcode(ref pc)) if pc == CUSTOMER));
    // Stores are never geocoded once the customer lookup fails
    assert_eq!(geocoder.lookups(), vec![CUSTOMER.to_string()]);
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels_unavailable: true,
        ..Default::default()
    });

    let result = resolver(platform, Arc::new(FakeGeocoder::default()))
        .resolve("4242", CUSTOMER)
        .await;

    assert!(matches!(result, Err(ResolveError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn test_store_geocoding_outage_falls_back_to_join_order() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![
            InventoryRecord::new(4, 1),
            InventoryRecord::new(3, 2),
            InventoryRecord::new(2, 3),
            InventoryRecord::new(1, 4),
        ],
        locations: vec![
            location(1, "Brighton", "", "BN1 1UP"),
            location(2, "Bristol", "", "BS1 4DJ"),
            location(3, "Leeds", "", "LS1 6HB"),
            location(4, "Norwich", "", "NR2 1BH"),
        ],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder {
        broken: true,
        ..FakeGeocoder::with(&[(CUSTOMER, 50.8262, -0.1167)])
    });

    let outcome = resolver(platform, geocoder).resolve("4242", CUSTOMER).await.unwrap();

    let StockOutcome::Stores(list) = outcome else {
        panic!("expected a store list");
    };
    assert!(!list.ranked);
    let names: Vec<_> = list.stores.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Norwich", "Leeds", "Bristol"]);
    assert!(list.stores.iter().all(|s| s.distance_miles.is_none()));
}

#[tokio::test]
async fn test_ranking_properties() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: vec![
            InventoryRecord::new(1, 2),
            InventoryRecord::new(2, 0),
            InventoryRecord::new(3, 7),
            InventoryRecord::new(4, 1),
            InventoryRecord::new(5, 9),
            InventoryRecord::new(6, 3),
        ],
        locations: vec![
            location(1, "Leeds", "", "LS1 6HB"),
            location(2, "Brighton", "", "BN1 1UP"),
            location(3, "Unit 22", "", "BN9 0AA"),
            location(4, "Lewes", "", "BN7 2AB"),
            location(5, "No Postcode", "", ""),
            location(6, "Bristol", "", "BS1 4DJ"),
        ],
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder::with(&[
        (CUSTOMER, 50.8262, -0.1167),
        ("LS1 6HB", 53.7980, -1.5440),
        ("BN1 1UP", 50.8247, -0.1392),
        ("BN9 0AA", 50.7930, 0.0490),
        ("BN7 2AB", 50.8730, 0.0090),
        ("BS1 4DJ", 51.4545, -2.5879),
    ]));
    let resolver = resolver(platform, geocoder.clone());

    let outcome = resolver.resolve("4242", CUSTOMER).await.unwrap();
    let stores = outcome.stores();

    assert!(stores.len() <= 3);
    assert!(stores.iter().all(|s| s.available > 0));
    assert!(stores.iter().all(|s| s.name != "Unit 22"));
    assert!(stores.iter().all(|s| s.distance_miles.is_some()));
    assert!(stores
        .windows(2)
        .all(|w| w[0].distance_miles <= w[1].distance_miles));

    let names: Vec<_> = stores.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Lewes", "Bristol", "Leeds"]);

    // Warehouse and the store without a postcode are never geocoded
    let lookups = geocoder.lookups();
    assert!(!lookups.contains(&"BN9 0AA".to_string()));
    assert!(!lookups.contains(&String::new()));
}

#[tokio::test]
async fn test_max_results_override() {
    let platform = Arc::new(FakePlatform {
        item_id: Some(900),
        levels: (1..=6).map(|id| InventoryRecord::new(id, 1)).collect(),
        locations: (1..=6)
            .map(|id| location(id, &format!("Store {}", id), "", &format!("PC{}", id)))
            .collect(),
        ..Default::default()
    });
    let geocoder = Arc::new(FakeGeocoder::with(&[
        (CUSTOMER, 51.0, 0.0),
        ("PC1", 51.6, 0.0),
        ("PC2", 51.5, 0.0),
        ("PC3", 51.4, 0.0),
        ("PC4", 51.3, 0.0),
        ("PC5", 51.2, 0.0),
        ("PC6", 51.1, 0.0),
    ]));
    let resolver = resolver(platform, geocoder);

    let options = ResolveOptions::new(LocationMatcher::none(), 5);
    let outcome = resolver.resolve_with("4242", CUSTOMER, &options).await.unwrap();

    let names: Vec<_> = outcome.stores().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Store 6", "Store 5", "Store 4", "Store 3", "Store 2"]);
}
