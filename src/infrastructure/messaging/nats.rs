//! # NATS Message Sink
//!
//! [`MessageSink`] backed by a NATS connection. Topics map to subjects and
//! message headers map to NATS headers.

use super::traits::{
    MessageHeaders, MessageSink, PublishError, PublishResult, validate_headers,
};
use async_nats::{HeaderMap, HeaderName, HeaderValue};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Publishes messages through a shared NATS client.
#[derive(Clone)]
pub struct NatsMessageSink {
    client: async_nats::Client,
}

impl NatsMessageSink {
    /// Connects to the NATS server at `url`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Connection` if the server cannot be reached.
    pub async fn connect(url: &str) -> PublishResult<Self> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| PublishError::connection(format!("{url}: {e}")))?;
        info!(url, "connected to NATS");
        Ok(Self { client })
    }

    /// Converts caller headers into NATS headers.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidHeader` if a name or value would break
    /// the protocol frame.
    fn to_header_map(headers: &MessageHeaders) -> PublishResult<HeaderMap> {
        validate_headers(headers)?;

        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_str(name)
                .map_err(|_| PublishError::invalid_header(name, "not a valid NATS header name"))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| PublishError::invalid_header(name, "not a valid NATS header value"))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

impl fmt::Debug for NatsMessageSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NatsMessageSink")
            .field("state", &self.client.connection_state())
            .finish()
    }
}

#[async_trait]
impl MessageSink for NatsMessageSink {
    async fn publish(
        &self,
        topic: &str,
        payload: Bytes,
        headers: &MessageHeaders,
    ) -> PublishResult<()> {
        let header_map = Self::to_header_map(headers)?;

        let size = payload.len();
        self.client
            .publish_with_headers(topic.to_string(), header_map, payload)
            .await
            .map_err(|e| PublishError::rejected(topic, e.to_string()))?;
        self.client
            .flush()
            .await
            .map_err(|e| PublishError::rejected(topic, e.to_string()))?;

        debug!(topic, size, headers = headers.len(), "message published");
        Ok(())
    }
}
