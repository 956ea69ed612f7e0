//! # Application Services
//!
//! - [`MarketDispatcher`]: concurrent fan-out over the requested markets
//! - [`AsyncCompletionPublisher`]: background best-price search with publish
//! - [`RetryPolicy`]: fixed-backoff retry for publishing

pub mod dispatcher;
pub mod publisher;
pub mod retry;

pub use dispatcher::{DispatchConfig, FilterKind, MarketDispatcher};
pub use publisher::{AsyncCompletionPublisher, DEFAULT_TOPIC};
pub use retry::{RetryError, RetryPolicy, Retryable, execute_with_retry};
