use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{ResolveError, StockResolver};
use crate::models::{
    ErrorResponse, HealthResponse, HtmlSnippetResponse, ResponseFormat, StockCheckRequest,
    StockCheckResponse, StockOutcome,
};
use crate::routes::render;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: StockResolver,
}

/// Configure all stock-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/stock", web::post().to(check_stock));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// HTTP status for a failed resolution
pub fn error_status(err: &ResolveError) -> StatusCode {
    match err {
        ResolveError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ResolveError::VariantNotFound(_) => StatusCode::NOT_FOUND,
        ResolveError::InvalidPostcode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ResolveError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Customer-facing wording for a failed resolution
pub fn error_message(err: &ResolveError) -> &'static str {
    match err {
        ResolveError::InvalidRequest(_) => "Please provide a variant ID and postcode",
        ResolveError::VariantNotFound(_) => "Product variant not found",
        ResolveError::InvalidPostcode(_) => "Invalid UK postcode. Please check and try again.",
        ResolveError::UpstreamUnavailable(_) => "Unable to connect to store. Please try again.",
    }
}

fn error_kind(err: &ResolveError) -> &'static str {
    match err {
        ResolveError::InvalidRequest(_) => "invalid_request",
        ResolveError::VariantNotFound(_) => "variant_not_found",
        ResolveError::InvalidPostcode(_) => "invalid_postcode",
        ResolveError::UpstreamUnavailable(_) => "upstream_unavailable",
    }
}

/// Stock check endpoint
///
/// POST /api/v1/stock
///
/// Request body:
/// ```json
/// {
///   "variant_id": "string | number",
///   "postcode": "string",
///   "format": "json | html"
/// }
/// ```
async fn check_stock(
    state: web::Data<AppState>,
    req: web::Json<StockCheckRequest>,
) -> HttpResponse {
    let req = req.into_inner();

    let result = match req.validate() {
        Ok(()) => {
            tracing::info!(
                "Processing stock check for variant: {}, postcode: {}",
                req.variant_id,
                req.postcode
            );
            state.resolver.resolve(&req.variant_id, &req.postcode).await
        }
        Err(errors) => {
            tracing::info!("Validation failed for stock request: field_errors={:?}", errors);
            Err(ResolveError::InvalidRequest(errors.to_string()))
        }
    };

    if let Err(e) = &result {
        match e {
            ResolveError::UpstreamUnavailable(_) => tracing::error!("Stock check failed: {}", e),
            _ => tracing::info!("Stock check rejected: {}", e),
        }
    }

    match req.format {
        ResponseFormat::Json => json_response(result),
        ResponseFormat::Html => html_response(result),
    }
}

fn json_response(result: Result<StockOutcome, ResolveError>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(StockCheckResponse::from(outcome)),
        Err(e) => {
            let status = error_status(&e);
            HttpResponse::build(status).json(ErrorResponse {
                error: error_kind(&e).to_string(),
                message: e.to_string(),
                status_code: status.as_u16(),
            })
        }
    }
}

fn html_response(result: Result<StockOutcome, ResolveError>) -> HttpResponse {
    let (status, rendered) = match &result {
        Ok(outcome) => (StatusCode::OK, render::render_outcome(outcome)),
        Err(e) => (error_status(e), render::render_error(error_message(e))),
    };

    match rendered {
        Ok(html) => HttpResponse::build(status).json(HtmlSnippetResponse { html }),
        Err(e) => {
            tracing::error!("Failed to render stock snippet: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "render_failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
