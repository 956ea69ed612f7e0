//! # HTTP Client Utilities
//!
//! Shared HTTP client for market adapters.
//!
//! Wraps `reqwest` with a fixed timeout and the error mapping every adapter
//! relies on:
//! - transport failures and non-2xx answers become
//!   `MarketError::UpstreamUnavailable`
//! - bodies that do not decode become `MarketError::Decode`
//!
//! # Examples
//!
//! ```ignore
//! use price_service::infrastructure::markets::http_client::HttpClient;
//!
//! let client = HttpClient::new(5000)?;
//! let response: SearchResponse = client.get_json("https://search.example/api").await?;
//! ```

use crate::infrastructure::markets::error::{MarketError, MarketResult};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// HTTP client wrapper for market adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> MarketResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Makes a GET request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::UpstreamUnavailable` if the request fails or the
    /// status is not 2xx, `MarketError::Decode` if the body is not the
    /// expected JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> MarketResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Self::handle_response(response).await
    }

    /// Makes a POST request with a JSON body and decodes the JSON response.
    ///
    /// The body is serialized with `serde_json`, keeping field declaration
    /// order.
    ///
    /// # Errors
    ///
    /// Same as [`get_json`](Self::get_json).
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> MarketResult<T> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| MarketError::internal(format!("failed to encode request: {e}")))?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Self::handle_response(response).await
    }

    /// Checks the status and decodes the body.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> MarketResult<T> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| MarketError::upstream_unavailable(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            let excerpt = String::from_utf8_lossy(body.get(..200).unwrap_or(body.as_ref()));
            return Err(MarketError::upstream_status(
                status.as_u16(),
                format!("HTTP {status}: {excerpt}"),
            ));
        }

        serde_json::from_slice(&body)
            .map_err(|e| MarketError::decode(format!("failed to parse response: {e}")))
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> MarketError {
        if error.is_timeout() {
            MarketError::upstream_unavailable(format!("request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            MarketError::upstream_unavailable(format!("connection failed: {error}"))
        } else {
            MarketError::upstream_unavailable(format!("HTTP request failed: {error}"))
        }
    }
}
