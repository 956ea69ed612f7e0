//! # Market Errors
//!
//! Error types for market adapter operations.
//!
//! # Examples
//!
//! ```
//! use price_service::infrastructure::markets::error::MarketError;
//!
//! let error = MarketError::upstream_status(503, "search API unavailable");
//! assert_eq!(error.status(), Some(503));
//!
//! let error = MarketError::decode("expected value at line 1 column 1");
//! assert_eq!(error.status(), None);
//! ```

use crate::infrastructure::browser::BrowserError;
use thiserror::Error;

/// Error type for market adapter operations.
///
/// None of these leave the dispatcher: a failing market is logged and left
/// out of the aggregated result.
#[derive(Debug, Clone, Error)]
pub enum MarketError {
    /// The marketplace or helper service could not be reached, or answered
    /// with a non-success status.
    #[error("market upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Error message.
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
    },

    /// The caller went away before the work finished.
    #[error("connection closed by client")]
    ConnectionClosed,

    /// The upstream body could not be decoded.
    #[error("market response decode error: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// Pagination ran out of attempts without a large enough batch.
    #[error("no sufficient sample after {attempts} attempts (last batch had {last_len} products)")]
    SampleExhausted {
        /// Number of requests made.
        attempts: u32,
        /// Size of the last batch seen.
        last_len: usize,
    },

    /// The browser step failed.
    #[error("market browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Internal adapter error.
    #[error("market internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl MarketError {
    /// Creates an upstream unavailable error.
    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            status: None,
        }
    }

    /// Creates an upstream unavailable error carrying the response status.
    #[must_use]
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the upstream HTTP status, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type for market operations.
pub type MarketResult<T> = Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_keeps_status() {
        let error = MarketError::upstream_status(503, "down");
        assert_eq!(error.status(), Some(503));
    }

    #[test]
    fn closed_connection_has_no_status() {
        assert_eq!(MarketError::ConnectionClosed.status(), None);
    }

    #[test]
    fn exhausted_display() {
        let error = MarketError::SampleExhausted {
            attempts: 10,
            last_len: 4,
        };
        let display = error.to_string();
        assert!(display.contains("10 attempts"));
        assert!(display.contains("4 products"));
    }

    #[test]
    fn browser_errors_convert() {
        let error: MarketError = BrowserError::PoolClosed.into();
        assert!(matches!(error, MarketError::Browser(_)));
    }
}
