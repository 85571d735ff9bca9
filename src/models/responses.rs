use serde::{Deserialize, Serialize};
use crate::models::domain::{ResolvedStore, StockOutcome};

/// Response for the JSON stock check endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheckResponse {
    pub status: StockStatus,
    pub message: Option<String>,
    /// Whether `stores` is ordered by distance from the customer
    pub nearby: bool,
    pub stores: Vec<ResolvedStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    OutOfStock,
    NoQualifyingStore,
}

pub const OUT_OF_STOCK_MESSAGE: &str = "Sorry, this item is currently out of stock at all stores.";
pub const NO_QUALIFYING_STORE_MESSAGE: &str = "No stores found with this item in stock.";

impl From<StockOutcome> for StockCheckResponse {
    fn from(outcome: StockOutcome) -> Self {
        match outcome {
            StockOutcome::Stores(list) => Self {
                status: StockStatus::InStock,
                message: None,
                nearby: list.ranked,
                stores: list.stores,
            },
            StockOutcome::OutOfStock => Self {
                status: StockStatus::OutOfStock,
                message: Some(OUT_OF_STOCK_MESSAGE.to_string()),
                nearby: false,
                stores: vec![],
            },
            StockOutcome::NoQualifyingStore => Self {
                status: StockStatus::NoQualifyingStore,
                message: Some(NO_QUALIFYING_STORE_MESSAGE.to_string()),
                nearby: false,
                stores: vec![],
            },
        }
    }
}

/// Response for the HTML snippet variant of the stock check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSnippetResponse {
    pub html: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
