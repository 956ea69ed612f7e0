//! # Async Completion Publisher
//!
//! Runs a best-price dispatch in the background and publishes the result.
//!
//! The HTTP handler returns as soon as the work is scheduled. The background
//! task owns a fresh cancellation token, so a client that disconnects right
//! after the accept does not abort the search. Dispatch failures publish
//! nothing; publish failures are retried and then logged.

use crate::application::dto::ProductResponse;
use crate::application::services::dispatcher::MarketDispatcher;
use crate::application::services::retry::{RetryPolicy, execute_with_retry};
use crate::domain::entities::ProductRequest;
use crate::infrastructure::messaging::{MessageHeaders, MessageSink};
use bytes::Bytes;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

/// Default topic for finished results.
pub const DEFAULT_TOPIC: &str = "products";

/// Publishes best-price results off the request path.
#[derive(Debug, Clone)]
pub struct AsyncCompletionPublisher {
    dispatcher: MarketDispatcher,
    sink: Arc<dyn MessageSink>,
    topic: String,
    retry: RetryPolicy,
}

impl AsyncCompletionPublisher {
    /// Creates a publisher writing to [`DEFAULT_TOPIC`].
    ///
    /// # Arguments
    ///
    /// * `dispatcher` - Runs the best-price search.
    /// * `sink` - Broker the finished result is published to.
    #[must_use]
    pub fn new(dispatcher: MarketDispatcher, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            dispatcher,
            sink,
            topic: DEFAULT_TOPIC.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Sets the publish retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the topic.
    #[inline]
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Schedules a best-price search whose result is published with
    /// `headers` attached.
    ///
    /// # Arguments
    ///
    /// * `request` - Validated search request.
    /// * `headers` - Correlation headers copied onto the message.
    ///
    /// # Returns
    ///
    /// The task handle. It is only needed by callers that want to wait for
    /// completion; dropping it leaves the task running. Failures are logged
    /// inside the task: a failed search publishes nothing, and a publish is
    /// retried per the configured [`RetryPolicy`].
    pub fn spawn_best_price(
        &self,
        request: Arc<ProductRequest>,
        headers: MessageHeaders,
    ) -> JoinHandle<()> {
        let this = self.clone();
        let span = info_span!("async_best_price", request_id = %request.id());
        tokio::spawn(
            async move {
                this.complete(request, headers).await;
            }
            .instrument(span),
        )
    }

    async fn complete(&self, request: Arc<ProductRequest>, headers: MessageHeaders) {
        let cancel = CancellationToken::new();
        let samples = match self.dispatcher.filter_by_best_price(request, &cancel).await {
            Ok(samples) => samples,
            Err(error) => {
                warn!(%error, "async search failed, nothing published");
                return;
            }
        };

        let payload = match ProductResponse::new(samples).to_bytes() {
            Ok(bytes) => Bytes::from(bytes),
            Err(error) => {
                error!(%error, "could not serialize async result");
                return;
            }
        };

        let topic = self.topic.as_str();
        let sink = self.sink.as_ref();
        let outcome = execute_with_retry(&self.retry, || {
            sink.publish(topic, payload.clone(), &headers)
        })
        .await;

        match outcome {
            Ok(()) => info!(topic, "async result published"),
            Err(error) => warn!(topic, %error, "async result dropped"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::application::services::dispatcher::DispatchConfig;
    use crate::domain::value_objects::Market;
    use crate::infrastructure::markets::MarketRegistry;
    use crate::infrastructure::markets::testing::{StubAdapter, StubCall};
    use crate::infrastructure::messaging::{PublishError, PublishResult, validate_headers};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Debug, Clone)]
    struct Published {
        topic: String,
        payload: Bytes,
        headers: MessageHeaders,
    }

    #[derive(Debug, Default)]
    struct RecordingSink {
        fail_first: usize,
        attempts: Mutex<usize>,
        published: Mutex<Vec<Published>>,
    }

    impl RecordingSink {
        fn failing_first(n: usize) -> Self {
            Self {
                fail_first: n,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn publish(
            &self,
            topic: &str,
            payload: Bytes,
            headers: &MessageHeaders,
        ) -> PublishResult<()> {
            let attempt = {
                let mut attempts = self.attempts.lock();
                *attempts += 1;
                *attempts
            };
            validate_headers(headers)?;
            if attempt <= self.fail_first {
                return Err(PublishError::connection("broker unavailable"));
            }
            self.published.lock().push(Published {
                topic: topic.to_string(),
                payload,
                headers: headers.clone(),
            });
            Ok(())
        }
    }

    fn publisher(stub: Arc<StubAdapter>, sink: Arc<RecordingSink>) -> AsyncCompletionPublisher {
        let registry = Arc::new(MarketRegistry::new().with(stub));
        let dispatcher = MarketDispatcher::new(registry, DispatchConfig::default());
        AsyncCompletionPublisher::new(dispatcher, sink).with_retry(RetryPolicy::fixed(5, 1))
    }

    fn request() -> Arc<ProductRequest> {
        Arc::new(
            ProductRequest::builder("phone")
                .markets([Market::Wildberries])
                .build(),
        )
    }

    fn headers() -> MessageHeaders {
        MessageHeaders::from([
            ("chat-id".to_string(), "42".to_string()),
            ("user".to_string(), "alice".to_string()),
        ])
    }

    #[tokio::test]
    async fn publishes_result_with_headers() {
        let stub = Arc::new(StubAdapter::new(Market::Wildberries));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(Arc::clone(&stub), Arc::clone(&sink));

        publisher
            .spawn_best_price(request(), headers())
            .await
            .unwrap();

        assert_eq!(stub.calls(), vec![StubCall::Best]);
        let published = sink.published.lock().clone();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, DEFAULT_TOPIC);
        assert_eq!(published[0].headers, headers());

        let body: serde_json::Value = serde_json::from_slice(&published[0].payload).unwrap();
        assert_eq!(body["samples"]["wildberries"]["market"], "Wildberries");
    }

    #[tokio::test]
    async fn dispatch_failure_publishes_nothing() {
        let stub = Arc::new(StubAdapter::new(Market::Wildberries).failing("blocked"));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(stub, Arc::clone(&sink));

        publisher
            .spawn_best_price(request(), headers())
            .await
            .unwrap();

        assert_eq!(*sink.attempts.lock(), 0);
        assert!(sink.published.lock().is_empty());
    }

    #[tokio::test]
    async fn transient_publish_failures_are_retried() {
        let stub = Arc::new(StubAdapter::new(Market::Wildberries));
        let sink = Arc::new(RecordingSink::failing_first(3));
        let publisher = publisher(stub, Arc::clone(&sink));

        publisher
            .spawn_best_price(request(), headers())
            .await
            .unwrap();

        assert_eq!(*sink.attempts.lock(), 4);
        assert_eq!(sink.published.lock().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_five_retries() {
        let stub = Arc::new(StubAdapter::new(Market::Wildberries));
        let sink = Arc::new(RecordingSink::failing_first(usize::MAX));
        let publisher = publisher(stub, Arc::clone(&sink));

        publisher
            .spawn_best_price(request(), headers())
            .await
            .unwrap();

        assert_eq!(*sink.attempts.lock(), 6);
        assert!(sink.published.lock().is_empty());
    }

    #[tokio::test]
    async fn unforwardable_header_is_not_retried() {
        let stub = Arc::new(StubAdapter::new(Market::Wildberries));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(stub, Arc::clone(&sink));
        let headers =
            MessageHeaders::from([("X".to_string(), "a\r\nInjected: evil".to_string())]);

        publisher
            .spawn_best_price(request(), headers)
            .await
            .unwrap();

        assert_eq!(*sink.attempts.lock(), 1);
        assert!(sink.published.lock().is_empty());
    }

    #[tokio::test]
    async fn custom_topic() {
        let stub = Arc::new(StubAdapter::new(Market::Wildberries));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(stub, Arc::clone(&sink)).with_topic("prices.best");
        assert_eq!(publisher.topic(), "prices.best");

        publisher
            .spawn_best_price(request(), MessageHeaders::new())
            .await
            .unwrap();

        assert_eq!(sink.published.lock()[0].topic, "prices.best");
    }
}
