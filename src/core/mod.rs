// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranking;
pub mod resolver;

pub use distance::{distance_between, haversine_distance, is_valid_coordinate};
pub use filters::{distinct_location_ids, exclude_locations, join_locations, retain_in_stock, LocationMatcher};
pub use ranking::{rank_stores, DEFAULT_MAX_RESULTS};
pub use resolver::{ResolveError, ResolveOptions, StockResolver, DEFAULT_GEOCODING_CONCURRENCY};
