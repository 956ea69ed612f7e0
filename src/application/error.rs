//! # Application Errors
//!
//! Error types for the aggregation use cases.
//!
//! Adapter failures never cross this boundary: the dispatcher logs and skips
//! them. Only total failure or a caller disconnect reaches the HTTP layer.
//!
//! # Examples
//!
//! ```
//! use price_service::application::error::DispatchError;
//!
//! let err = DispatchError::all_markets_failed(2);
//! assert!(err.to_string().contains("2 market"));
//! ```

use crate::domain::value_objects::Market;
use thiserror::Error;

/// Errors raised by the aggregation dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A requested market has no registered adapter.
    ///
    /// Only logged; the market is skipped.
    #[error("market not configured: {0}")]
    MarketNotConfigured(Market),

    /// No requested market produced a sample.
    #[error("all markets failed: {attempted} market(s) attempted, none succeeded")]
    AllMarketsFailed {
        /// Number of markets that were dispatched to.
        attempted: usize,
    },

    /// The caller went away before the result was ready.
    #[error("connection closed by the client")]
    ConnectionClosed,
}

impl DispatchError {
    /// Creates an all-markets-failed error.
    #[must_use]
    pub fn all_markets_failed(attempted: usize) -> Self {
        Self::AllMarketsFailed { attempted }
    }

    /// Returns true if the failure originates upstream rather than locally.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::AllMarketsFailed { .. })
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            DispatchError::MarketNotConfigured(Market::MegaMarket).to_string(),
            "market not configured: Megamarket"
        );
        assert_eq!(
            DispatchError::ConnectionClosed.to_string(),
            "connection closed by the client"
        );
    }

    #[test]
    fn upstream_classification() {
        assert!(DispatchError::all_markets_failed(1).is_upstream());
        assert!(!DispatchError::ConnectionClosed.is_upstream());
    }
}
