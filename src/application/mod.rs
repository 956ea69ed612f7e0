//! # Application Layer
//!
//! Aggregation use cases built on top of the market adapters.
//!
//! ## Services
//!
//! - `MarketDispatcher`: applies one filter kind across all requested markets
//! - `AsyncCompletionPublisher`: decouples slow searches from the HTTP
//!   round-trip by publishing their result to a message broker

pub mod dto;
pub mod error;
pub mod services;

pub use dto::{AsyncRequestBody, MarketView, ProductResponse, SupportedMarkets};
pub use error::{DispatchError, DispatchResult};
pub use services::{
    AsyncCompletionPublisher, DispatchConfig, FilterKind, MarketDispatcher, RetryError,
    RetryPolicy, Retryable, execute_with_retry,
};
