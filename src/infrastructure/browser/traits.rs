//! # Browser Traits
//!
//! Ports for the headless browser used to render lazily loaded catalog
//! pages.
//!
//! A [`BrowserPool`] hands out long-lived [`BrowsingSession`]s. Sessions are
//! acquired once, when an adapter is constructed, and all of them are
//! released together by [`BrowserPool::release_all`] at shutdown.

use super::error::BrowserResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A single browser tab driven remotely.
///
/// Implementations are not required to tolerate concurrent commands;
/// callers serialize access to one session.
#[async_trait]
pub trait BrowsingSession: Send + Sync + fmt::Debug {
    /// Returns the driver-assigned session id.
    fn id(&self) -> &str;

    /// Loads `url` in the session.
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// Waits until an element matching `selector` exists.
    ///
    /// # Errors
    ///
    /// - `BrowserError::Timeout` - The element did not appear in time
    async fn wait_for(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Scrolls the page to the bottom, triggering lazy loading.
    async fn scroll_to_bottom(&self) -> BrowserResult<()>;

    /// Returns the inner HTML of the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// - `BrowserError::ElementNotFound` - Nothing matches the selector
    async fn inner_html(&self, selector: &str) -> BrowserResult<String>;
}

/// Source of browsing sessions.
#[async_trait]
pub trait BrowserPool: Send + Sync + fmt::Debug {
    /// Opens a new session.
    ///
    /// # Errors
    ///
    /// - `BrowserError::SessionCreate` - The driver refused the session
    /// - `BrowserError::PoolClosed` - The pool was already released
    async fn new_session(&self) -> BrowserResult<Arc<dyn BrowsingSession>>;

    /// Closes every session opened by this pool.
    ///
    /// Only the first call does any work.
    async fn release_all(&self);
}
