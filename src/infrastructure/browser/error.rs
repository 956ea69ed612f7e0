//! # Browser Errors
//!
//! Error types for headless browser sessions.

use thiserror::Error;

/// Error type for browser pool and session operations.
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    /// The driver refused to open a new session.
    #[error("browser session creation failed: {message}")]
    SessionCreate {
        /// Error message.
        message: String,
    },

    /// A WebDriver command returned an error.
    #[error("browser command '{command}' failed: {message}")]
    Command {
        /// Command name.
        command: String,
        /// Error message.
        message: String,
    },

    /// A selector did not appear in time.
    #[error("timed out after {timeout_ms}ms waiting for '{selector}'")]
    Timeout {
        /// The awaited selector.
        selector: String,
        /// Wait budget in milliseconds.
        timeout_ms: u64,
    },

    /// A selector matched nothing.
    #[error("no element matches '{selector}'")]
    ElementNotFound {
        /// The selector.
        selector: String,
    },

    /// The driver could not be reached.
    #[error("browser transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// Sessions were already released.
    #[error("browser pool is closed")]
    PoolClosed,
}

impl BrowserError {
    /// Creates a session creation error.
    #[must_use]
    pub fn session_create(message: impl Into<String>) -> Self {
        Self::SessionCreate {
            message: message.into(),
        }
    }

    /// Creates a command error.
    #[must_use]
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a wait timeout error.
    #[must_use]
    pub fn timeout(selector: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            selector: selector.into(),
            timeout_ms,
        }
    }

    /// Creates an element not found error.
    #[must_use]
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Result type for browser operations.
pub type BrowserResult<T> = Result<T, BrowserError>;
