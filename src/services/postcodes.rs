use crate::models::GeoCoordinate;
use crate::services::{Geocoder, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const SERVICE: &str = "postcodes.io";

/// Errors that can occur when geocoding through postcodes.io
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(StatusCode),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<GeocodeError> for UpstreamError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::InvalidResponse(message) => UpstreamError::Malformed {
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

/// Strip all whitespace and upper-case a UK postcode
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: u16,
    result: Option<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// postcodes.io lookup client
pub struct PostcodesClient {
    base_url: String,
    client: Client,
}

impl PostcodesClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Look up a postcode
    ///
    /// Unknown postcodes (404, or a lookup without coordinates) resolve to `None`.
    pub async fn lookup(&self, postcode: &str) -> Result<Option<GeoCoordinate>, GeocodeError> {
        let clean = normalize_postcode(postcode);
        if clean.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/postcodes/{}", self.base_url, urlencoding::encode(&clean));
        tracing::debug!("Geocoding postcode {}", clean);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(GeocodeError::ApiError(status)),
            _ => {}
        }

        let body: LookupResponse = response.json().await?;
        if body.status != 200 {
            return Ok(None);
        }

        let Some(LookupResult {
            latitude: Some(lat),
            longitude: Some(lon),
        }) = body.result
        else {
            return Ok(None);
        };

        GeoCoordinate::new(lat, lon)
            .map(Some)
            .ok_or_else(|| {
                GeocodeError::InvalidResponse(format!(
                    "coordinates out of range for {}: {}, {}",
                    clean, lat, lon
                ))
            })
    }
}

#[async_trait]
impl Geocoder for PostcodesClient {
    async fn geocode(&self, postal_code: &str) -> Result<Option<GeoCoordinate>, UpstreamError> {
        Ok(self.lookup(postal_code).await?)
    }
}
