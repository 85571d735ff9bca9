use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Request to check nearby stock for a variant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockCheckRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "variantId", rename = "variant_id", default, deserialize_with = "string_or_number")]
    pub variant_id: String,
    #[validate(length(min = 1))]
    #[serde(default, deserialize_with = "string_or_null")]
    pub postcode: String,
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Shape of the stock check response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Html,
}

/// Shopify ids arrive as JSON numbers from Liquid templates and as strings elsewhere.
/// `null` reads as empty so validation reports it.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(s)) => s.trim().to_string(),
        Some(Id::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
