//! # REST Handlers
//!
//! Request handlers for the product search endpoints.
//!
//! # Endpoints
//!
//! ## Products
//! - `GET /products/filter/markets` - Unfiltered search
//! - `GET /products/filter/price/price-range` - Search within a price range
//! - `GET /products/filter/price/exact-price` - Search around a price
//! - `GET /products/filter/price/best-price` - Cheapest products first
//! - `POST /products/filter/price/best-price/async` - Best price, published
//!   to the message broker
//!
//! ## Service
//! - `GET /api/markets` - Supported markets
//! - `GET /health` - Health check

use crate::api::rest::validation::{ProductQuery, ValidationError, async_headers};
use crate::application::dto::{ProductResponse, SupportedMarkets};
use crate::application::error::DispatchError;
use crate::application::services::{AsyncCompletionPublisher, MarketDispatcher};
use crate::domain::entities::ProductSample;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for REST handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Synchronous search entry point.
    pub dispatcher: MarketDispatcher,
    /// Asynchronous best-price entry point.
    pub publisher: AsyncCompletionPublisher,
}

// ============================================================================
// Error Response
// ============================================================================

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Failure of a REST call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request data was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The search did not produce a result.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationError::MalformedQuery(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self, "request failed");
        } else {
            info!(%status, error = %self, "request rejected");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type for REST handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Product Handlers
// ============================================================================

fn product_response(samples: Vec<ProductSample>) -> Response {
    (
        [
            (header::CACHE_CONTROL, "public, max-age=43200"),
            (header::CONTENT_LANGUAGE, "en, ru"),
        ],
        Json(ProductResponse::new(samples)),
    )
        .into_response()
}

/// Unfiltered search across the requested markets.
///
/// # Errors
///
/// Returns 400 on invalid parameters, 502 when every market failed.
#[instrument(skip_all)]
pub async fn filter_by_markets(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let request = Arc::new(params.product_request()?);

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let samples = state.dispatcher.filter_by_markets(request, &cancel).await?;
    Ok(product_response(samples))
}

/// Search within `[price_down, price_up]`.
///
/// # Errors
///
/// Returns 400 on invalid parameters, 502 when every market failed.
#[instrument(skip_all)]
pub async fn filter_by_price_range(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let request = Arc::new(params.product_request()?);
    let range = params.price_range()?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let samples = state
        .dispatcher
        .filter_by_price_range(request, range, &cancel)
        .await?;
    Ok(product_response(samples))
}

/// Search around `price`.
///
/// # Errors
///
/// Returns 400 on invalid parameters, 502 when every market failed.
#[instrument(skip_all)]
pub async fn filter_by_exact_price(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let request = Arc::new(params.product_request()?);
    let price = params.exact_price()?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let samples = state
        .dispatcher
        .filter_by_exact_price(request, price, &cancel)
        .await?;
    Ok(product_response(samples))
}

/// Search sorted by ascending price.
///
/// # Errors
///
/// Returns 400 on invalid parameters, 502 when every market failed.
#[instrument(skip_all)]
pub async fn filter_by_best_price(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let request = Arc::new(params.product_request()?);

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let samples = state
        .dispatcher
        .filter_by_best_price(request, &cancel)
        .await?;
    Ok(product_response(samples))
}

/// Schedules a best-price search whose result is published to the broker.
///
/// Answers `null` as soon as the search is scheduled. An empty body means no
/// correlation headers.
///
/// # Errors
///
/// Returns 400 on invalid parameters, a malformed body, or a header that
/// cannot be forwarded to the broker.
#[instrument(skip_all)]
pub async fn filter_by_best_price_async(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductQuery>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<()>> {
    let Query(params) = params?;
    let request = Arc::new(params.product_request()?);

    let headers = async_headers(&body)?;

    info!(request_id = %request.id(), headers = headers.len(), "async search accepted");
    // Detached; the handle is not awaited.
    drop(state.publisher.spawn_best_price(request, headers));
    Ok(Json(()))
}

// ============================================================================
// Service Handlers
// ============================================================================

/// Lists the markets the service can search.
pub async fn supported_markets() -> Json<SupportedMarkets> {
    Json(SupportedMarkets::all())
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Wire names of the configured markets.
    pub markets: Vec<String>,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let markets = state
        .dispatcher
        .registry()
        .markets()
        .into_iter()
        .map(|m| m.wire_name().to_string())
        .collect();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        markets,
    })
}

/// Fallback for unknown paths.
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    warn!("unknown resource requested");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("unknown resource")),
    )
}
