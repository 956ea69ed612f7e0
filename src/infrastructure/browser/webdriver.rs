//! # WebDriver Browser
//!
//! [`BrowserPool`] and [`BrowsingSession`] implementations speaking the W3C
//! WebDriver HTTP protocol, so any conforming driver (chromedriver,
//! geckodriver, a Selenium grid) can render catalog pages.
//!
//! # Examples
//!
//! ```ignore
//! use price_service::infrastructure::browser::{BrowserPool, WebDriverPool};
//!
//! let pool = WebDriverPool::new("http://localhost:9515", 30_000)?;
//! let session = pool.new_session().await?;
//! session.navigate("https://www.wildberries.ru").await?;
//! pool.release_all().await;
//! ```

use super::error::{BrowserError, BrowserResult};
use super::traits::{BrowserPool, BrowsingSession};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const ELEMENT_EXISTS: &str = "return document.querySelector(arguments[0]) !== null;";
const INNER_HTML: &str =
    "const el = document.querySelector(arguments[0]); return el ? el.innerHTML : null;";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Envelope of every WebDriver response.
#[derive(Debug, Deserialize)]
struct WireResponse<T> {
    value: T,
}

#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSessionValue {
    session_id: String,
}

/// Shared HTTP plumbing for pool and sessions.
#[derive(Debug, Clone)]
struct Driver {
    http: Client,
    base_url: String,
}

impl Driver {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        command: &str,
        request: RequestBuilder,
    ) -> BrowserResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| BrowserError::transport(format!("{command}: {e}")))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BrowserError::transport(format!("{command}: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<WireResponse<WireError>>(&body)
                .map(|w| format!("{}: {}", w.value.error, w.value.message))
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(BrowserError::command(command, message));
        }

        serde_json::from_slice::<WireResponse<T>>(&body)
            .map(|w| w.value)
            .map_err(|e| BrowserError::command(command, format!("malformed response: {e}")))
    }
}

/// A WebDriver session.
#[derive(Debug)]
pub struct WebDriverSession {
    driver: Driver,
    id: String,
    poll_interval: Duration,
}

impl WebDriverSession {
    async fn execute(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value> {
        let url = self.driver.endpoint(&format!("/session/{}/execute/sync", self.id));
        let request = self
            .driver
            .http
            .post(url)
            .json(&json!({ "script": script, "args": args }));
        self.driver.send("execute", request).await
    }
}

#[async_trait]
impl BrowsingSession for WebDriverSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        debug!(session = %self.id, url, "navigating");
        let endpoint = self.driver.endpoint(&format!("/session/{}/url", self.id));
        let request = self.driver.http.post(endpoint).json(&json!({ "url": url }));
        let _: Value = self.driver.send("navigate", request).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let found = self
                .execute(ELEMENT_EXISTS, vec![Value::from(selector)])
                .await?;
            if found.as_bool().unwrap_or(false) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                return Err(BrowserError::timeout(selector, timeout_ms));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn scroll_to_bottom(&self) -> BrowserResult<()> {
        self.execute(SCROLL_TO_BOTTOM, Vec::new()).await?;
        Ok(())
    }

    async fn inner_html(&self, selector: &str) -> BrowserResult<String> {
        match self.execute(INNER_HTML, vec![Value::from(selector)]).await? {
            Value::String(html) => Ok(html),
            _ => Err(BrowserError::element_not_found(selector)),
        }
    }
}

/// Pool of WebDriver sessions against one driver endpoint.
///
/// Tracks every session it opened so they can all be closed at shutdown.
#[derive(Debug)]
pub struct WebDriverPool {
    driver: Driver,
    capabilities: Value,
    poll_interval: Duration,
    sessions: Mutex<Vec<String>>,
    released: AtomicBool,
}

impl WebDriverPool {
    /// Creates a pool for the driver at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, command_timeout_ms: u64) -> BrowserResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(command_timeout_ms))
            .build()
            .map_err(|e| BrowserError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            driver: Driver {
                http,
                base_url: base_url.into(),
            },
            capabilities: Self::default_capabilities(true),
            poll_interval: DEFAULT_POLL_INTERVAL,
            sessions: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        })
    }

    /// Switches between headless and headed Chrome.
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.capabilities = Self::default_capabilities(headless);
        self
    }

    /// Sets how often `wait_for` polls the page.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    fn default_capabilities(headless: bool) -> Value {
        let mut args = vec!["--disable-gpu", "--no-sandbox"];
        if headless {
            args.push("--headless=new");
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

#[async_trait]
impl BrowserPool for WebDriverPool {
    async fn new_session(&self) -> BrowserResult<Arc<dyn BrowsingSession>> {
        if self.released.load(Ordering::Acquire) {
            return Err(BrowserError::PoolClosed);
        }

        let request = self
            .driver
            .http
            .post(self.driver.endpoint("/session"))
            .json(&self.capabilities);
        let created: NewSessionValue =
            self.driver
                .send("new_session", request)
                .await
                .map_err(|e| match e {
                    BrowserError::Command { message, .. } => BrowserError::session_create(message),
                    other => other,
                })?;

        info!(session = %created.session_id, "browser session opened");
        self.sessions.lock().push(created.session_id.clone());

        Ok(Arc::new(WebDriverSession {
            driver: self.driver.clone(),
            id: created.session_id,
            poll_interval: self.poll_interval,
        }))
    }

    async fn release_all(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        let sessions = std::mem::take(&mut *self.sessions.lock());
        join_all(sessions.into_iter().map(|id| async move {
            let request = self
                .driver
                .http
                .delete(self.driver.endpoint(&format!("/session/{id}")));
            match self.driver.send::<Value>("delete_session", request).await {
                Ok(_) => info!(session = %id, "browser session released"),
                Err(e) => warn!(session = %id, error = %e, "failed to release browser session"),
            }
        }))
        .await;
    }
}
