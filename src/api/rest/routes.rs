//! # REST Routes
//!
//! Route table of the HTTP API.
//!
//! # Route Structure
//!
//! ```text
//! /
//! ├── /health                                GET  - Health check
//! ├── /api/markets                           GET  - Supported markets
//! └── /products/filter
//!     ├── /markets                           GET  - Unfiltered search
//!     └── /price
//!         ├── /price-range                   GET  - Price range filter
//!         ├── /exact-price                   GET  - Exact price filter
//!         ├── /best-price                    GET  - Best price filter
//!         └── /best-price/async              POST - Best price, published
//! ```

use crate::api::rest::handlers::{
    AppState, filter_by_best_price, filter_by_best_price_async, filter_by_exact_price,
    filter_by_markets, filter_by_price_range, health_check, not_found, supported_markets,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 600 * 1024;

fn routes() -> Router<Arc<AppState>> {
    let price_routes = Router::new()
        .route("/price-range", get(filter_by_price_range))
        .route("/exact-price", get(filter_by_exact_price))
        .route("/best-price", get(filter_by_best_price))
        .route("/best-price/async", post(filter_by_best_price_async));

    let filter_routes = Router::new()
        .route("/markets", get(filter_by_markets))
        .nest("/price", price_routes);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/markets", get(supported_markets))
        .nest("/products/filter", filter_routes)
        .fallback(not_found)
}

/// Creates the router with tracing, compression and a body size limit.
pub fn create_router(state: Arc<AppState>) -> Router {
    routes()
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the router without middleware.
#[cfg(test)]
pub fn create_test_router(state: Arc<AppState>) -> Router {
    routes().with_state(state)
}
