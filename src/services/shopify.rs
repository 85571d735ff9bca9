use crate::models::{InventoryItemId, InventoryRecord, LocationId, LocationRecord};
use crate::services::{InventoryPlatform, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const SERVICE: &str = "shopify";

/// Errors that can occur when interacting with the Shopify Admin API
#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid access token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<ShopifyError> for UpstreamError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::InvalidResponse(message) => UpstreamError::Malformed {
                service: SERVICE,
                message,
            },
            other => UpstreamError::Unavailable {
                service: SERVICE,
                message: other.to_string(),
            },
        }
    }
}

/// Shopify Admin REST API client
///
/// Handles the three lookups behind a stock check:
/// - Variant to inventory item
/// - Inventory levels per location
/// - Location details
pub struct ShopifyClient {
    base_url: String,
    access_token: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct VariantEnvelope {
    variant: Option<VariantBody>,
}

#[derive(Debug, Deserialize)]
struct VariantBody {
    inventory_item_id: Option<InventoryItemId>,
}

#[derive(Debug, Deserialize)]
struct InventoryLevelsEnvelope {
    inventory_levels: Vec<InventoryLevel>,
}

#[derive(Debug, Deserialize)]
struct InventoryLevel {
    location_id: LocationId,
    available: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LocationsEnvelope {
    locations: Vec<ShopifyLocation>,
}

#[derive(Debug, Deserialize)]
struct ShopifyLocation {
    id: LocationId,
    name: Option<String>,
    address1: Option<String>,
    city: Option<String>,
    zip: Option<String>,
    phone: Option<String>,
}

impl From<InventoryLevel> for InventoryRecord {
    fn from(level: InventoryLevel) -> Self {
        // Null or oversold (negative) levels hold no sellable stock
        InventoryRecord::new(level.location_id, level.available.unwrap_or(0).max(0) as u64)
    }
}

impl From<ShopifyLocation> for LocationRecord {
    fn from(loc: ShopifyLocation) -> Self {
        LocationRecord {
            id: loc.id,
            name: loc
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Store".to_string()),
            address_line: loc.address1.unwrap_or_default(),
            city: loc.city.unwrap_or_default(),
            postal_code: loc.zip.unwrap_or_default(),
            phone: loc.phone.filter(|p| !p.trim().is_empty()),
        }
    }
}

impl ShopifyClient {
    /// Create a client for `https://{shop_domain}/admin/api/{api_version}`
    pub fn new(
        shop_domain: &str,
        access_token: String,
        api_version: &str,
        timeout_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let shop = shop_domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        let base_url = format!("https://{}/admin/api/{}", shop, api_version);

        Self::with_base_url(base_url, access_token, timeout_secs)
    }

    /// Create a client against an explicit Admin API base URL
    pub fn with_base_url(
        base_url: String,
        access_token: String,
        timeout_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ShopifyError> {
        tracing::debug!("Shopify GET {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await?;

        let response = check_status(response, url).await?;
        Ok(response.json().await?)
    }

    /// Fetch the inventory item id for a variant
    pub async fn get_inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<InventoryItemId>, ShopifyError> {
        let url = format!(
            "{}/variants/{}.json",
            self.base_url,
            urlencoding::encode(variant_id)
        );

        let json = match self.get_json(&url, &[]).await {
            Ok(json) => json,
            Err(ShopifyError::NotFound(_)) => {
                tracing::debug!("Variant {} not found", variant_id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let envelope: VariantEnvelope = serde_json::from_value(json).map_err(|e| {
            ShopifyError::InvalidResponse(format!("Failed to parse variant: {}", e))
        })?;

        Ok(envelope.variant.and_then(|v| v.inventory_item_id))
    }

    /// Fetch inventory levels for an inventory item across all locations
    pub async fn get_inventory_levels(
        &self,
        item_id: InventoryItemId,
    ) -> Result<Vec<InventoryRecord>, ShopifyError> {
        let url = format!("{}/inventory_levels.json", self.base_url);
        let json = self
            .get_json(&url, &[("inventory_item_ids", item_id.to_string())])
            .await?;

        let envelope: InventoryLevelsEnvelope = serde_json::from_value(json).map_err(|e| {
            ShopifyError::InvalidResponse(format!("Failed to parse inventory levels: {}", e))
        })?;

        Ok(envelope.inventory_levels.into_iter().map(InventoryRecord::from).collect())
    }

    /// Fetch location details for the given ids
    pub async fn get_locations(
        &self,
        ids: &[LocationId],
    ) -> Result<Vec<LocationRecord>, ShopifyError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let ids_param = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}/locations.json", self.base_url);
        let json = self.get_json(&url, &[("ids", ids_param)]).await?;

        let envelope: LocationsEnvelope = serde_json::from_value(json).map_err(|e| {
            ShopifyError::InvalidResponse(format!("Failed to parse locations: {}", e))
        })?;

        Ok(envelope.locations.into_iter().map(LocationRecord::from).collect())
    }
}

async fn check_status(response: Response, url: &str) -> Result<Response, ShopifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(ShopifyError::NotFound(url.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ShopifyError::Unauthorized),
        _ => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Shopify request to {} failed: {} - {}", url, status, body);
            Err(ShopifyError::ApiError(format!("{} returned {}", url, status)))
        }
    }
}

#[async_trait]
impl InventoryPlatform for ShopifyClient {
    async fn inventory_item_id(
        &self,
        variant_id: &str,
    ) -> Result<Option<InventoryItemId>, UpstreamError> {
        Ok(self.get_inventory_item_id(variant_id).await?)
    }

    async fn inventory_levels(
        &self,
        item_id: InventoryItemId,
    ) -> Result<Vec<InventoryRecord>, UpstreamError> {
        Ok(self.get_inventory_levels(item_id).await?)
    }

    async fn locations(&self, ids: &[LocationId]) -> Result<Vec<LocationRecord>, UpstreamError> {
        Ok(self.get_locations(ids).await?)
    }
}
