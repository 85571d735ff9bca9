// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    GeoCoordinate, InventoryItemId, InventoryRecord, LocationId, LocationRecord, ResolvedStore,
    ResolvedStoreList, StockOutcome, StockedLocation,
};
pub use requests::{ResponseFormat, StockCheckRequest};
pub use responses::{
    ErrorResponse, HealthResponse, HtmlSnippetResponse, StockCheckResponse, StockStatus,
    NO_QUALIFYING_STORE_MESSAGE, OUT_OF_STOCK_MESSAGE,
};
