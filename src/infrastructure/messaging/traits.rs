//! # Message Sink Trait
//!
//! Port for publishing finished results to a message broker.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Headers attached to a published message, copied verbatim from the caller.
pub type MessageHeaders = BTreeMap<String, String>;

/// Error type for publish operations.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The broker could not be reached.
    #[error("message broker connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// The broker rejected the message.
    #[error("message rejected on '{topic}': {message}")]
    Rejected {
        /// Target topic.
        topic: String,
        /// Error message.
        message: String,
    },

    /// A header name or value cannot be carried in a message frame.
    #[error("invalid message header {name:?}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// What is wrong with the header.
        reason: &'static str,
    },
}

impl PublishError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a rejection error.
    #[must_use]
    pub fn rejected(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid header error.
    #[must_use]
    pub fn invalid_header(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason,
        }
    }
}

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Checks that every header can be written into a message frame.
///
/// Names must be non-empty printable ASCII without `:`; values must not
/// contain line breaks.
///
/// # Errors
///
/// Returns `PublishError::InvalidHeader` for the first offending header.
pub fn validate_headers(headers: &MessageHeaders) -> PublishResult<()> {
    for (name, value) in headers {
        if name.is_empty() {
            return Err(PublishError::invalid_header(name, "empty name"));
        }
        if !name.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
            return Err(PublishError::invalid_header(
                name,
                "name must be printable ASCII without ':'",
            ));
        }
        if value.contains(['\r', '\n']) {
            return Err(PublishError::invalid_header(
                name,
                "value must not contain line breaks",
            ));
        }
    }
    Ok(())
}

/// A destination for asynchronous results.
///
/// Implementations must be safe to share between tasks.
#[async_trait]
pub trait MessageSink: Send + Sync + fmt::Debug {
    /// Publishes one message.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the broker does not accept the message.
    async fn publish(
        &self,
        topic: &str,
        payload: Bytes,
        headers: &MessageHeaders,
    ) -> PublishResult<()>;
}
