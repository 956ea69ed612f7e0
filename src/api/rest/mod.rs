//! # REST API
//!
//! HTTP endpoints over the aggregation services, built on axum.

pub mod handlers;
pub mod routes;
pub mod validation;

pub use handlers::{ApiError, AppState, ErrorResponse};
pub use routes::create_router;
pub use validation::{ProductQuery, ValidationError};
