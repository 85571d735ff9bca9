use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{LocationMatcher, ResolveOptions, DEFAULT_GEOCODING_CONCURRENCY, DEFAULT_MAX_RESULTS};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub shopify: ShopifySettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub stock: StockSettings,
    #[serde(default)]
    pub cors: CorsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifySettings {
    pub shop_domain: String,
    pub access_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockSettings {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Case-insensitive name/address fragments of locations hidden from customers
    #[serde(default = "default_exclude_locations")]
    pub exclude_locations: Vec<String>,
    /// Store geocodes in flight at once; 1 means sequential
    #[serde(default = "default_geocoding_concurrency")]
    pub geocoding_concurrency: usize,
}

impl Default for StockSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            exclude_locations: default_exclude_locations(),
            geocoding_concurrency: default_geocoding_concurrency(),
        }
    }
}

impl StockSettings {
    pub fn location_matcher(&self) -> LocationMatcher {
        LocationMatcher::name_or_address_contains(&self.exclude_locations)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::new(self.location_matcher(), self.max_results)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsSettings {
    /// Storefront origins allowed to call the API; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_api_version() -> String { "2025-10".to_string() }
fn default_geocoding_url() -> String { "https://api.postcodes.io".to_string() }
fn default_max_results() -> usize { DEFAULT_MAX_RESULTS }
fn default_exclude_locations() -> Vec<String> { vec!["unit 22".to_string()] }
fn default_geocoding_concurrency() -> usize { DEFAULT_GEOCODING_CONCURRENCY }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with STOCK_)
    /// 5. SHOPIFY_SHOP / SHOPIFY_TOKEN
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., STOCK__SHOPIFY__ACCESS_TOKEN -> shopify.access_token
            .add_source(env_source())
            .build()?;

        let settings = apply_shopify_env(settings)?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Refuse to start without Shopify credentials
    fn validated(self) -> Result<Self, ConfigError> {
        if self.shopify.shop_domain.trim().is_empty() {
            return Err(ConfigError::Message(
                "Server configuration error: missing shopify.shop_domain (SHOPIFY_SHOP)".to_string(),
            ));
        }
        if self.shopify.access_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "Server configuration error: missing shopify.access_token (SHOPIFY_TOKEN)".to_string(),
            ));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("STOCK")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("stock.exclude_locations")
        .with_list_parse_key("cors.allowed_origins")
        .try_parsing(true)
}

/// Shopify credentials from the plain variables used by the hosting platform
fn apply_shopify_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(shop) = env::var("SHOPIFY_SHOP") {
        builder = builder.set_override("shopify.shop_domain", shop)?;
    }
    if let Ok(token) = env::var("SHOPIFY_TOKEN") {
        builder = builder.set_override("shopify.access_token", token)?;
    }

    builder.build()
}
