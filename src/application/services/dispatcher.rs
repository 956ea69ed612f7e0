//! # Market Dispatcher
//!
//! Fans one [`ProductRequest`] out to every requested market and merges the
//! answers.
//!
//! Each market runs on its own task bounded by a per-market timeout. A market
//! that fails, times out or panics is logged and left out of the result; the
//! call only fails when no market succeeds or when the caller goes away.

use crate::application::error::{DispatchError, DispatchResult};
use crate::domain::entities::{ProductRequest, ProductSample};
use crate::domain::value_objects::{Market, PriceRange};
use crate::infrastructure::markets::{MarketAdapter, MarketError, MarketRegistry, MarketResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Price filter applied by every market of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// No price filter; the request's sort applies.
    Unfiltered,
    /// Products within an inclusive price range.
    PriceRange(PriceRange),
    /// Products around an exact price.
    ExactPrice(u64),
    /// Cheapest products first.
    BestPrice,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unfiltered => write!(f, "unfiltered"),
            Self::PriceRange(range) => write!(f, "price-range {range}"),
            Self::ExactPrice(price) => write!(f, "exact-price {price}"),
            Self::BestPrice => write!(f, "best-price"),
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Upper bound for one market's answer, in milliseconds.
    pub per_market_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            per_market_timeout_ms: 120_000,
        }
    }
}

impl DispatchConfig {
    /// Sets the per-market timeout.
    #[must_use]
    pub fn with_per_market_timeout(mut self, timeout_ms: u64) -> Self {
        self.per_market_timeout_ms = timeout_ms;
        self
    }
}

/// Runs requests against the configured markets.
#[derive(Debug, Clone)]
pub struct MarketDispatcher {
    registry: Arc<MarketRegistry>,
    config: DispatchConfig,
}

impl MarketDispatcher {
    /// Creates a dispatcher over `registry`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Adapters keyed by market, shared with every request.
    /// * `config` - Per-market timeout.
    #[must_use]
    pub fn new(registry: Arc<MarketRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Unfiltered search across the requested markets.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn filter_by_markets(
        &self,
        request: Arc<ProductRequest>,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<ProductSample>> {
        self.dispatch(request, FilterKind::Unfiltered, cancel).await
    }

    /// Search restricted to a price range.
    ///
    /// # Arguments
    ///
    /// * `request` - Validated search request.
    /// * `range` - Inclusive price window in roubles.
    /// * `cancel` - Trips when the caller goes away.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn filter_by_price_range(
        &self,
        request: Arc<ProductRequest>,
        range: PriceRange,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<ProductSample>> {
        self.dispatch(request, FilterKind::PriceRange(range), cancel)
            .await
    }

    /// Search around an exact price.
    ///
    /// Every market searches `[price, price * 1.1]`.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn filter_by_exact_price(
        &self,
        request: Arc<ProductRequest>,
        price: u64,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<ProductSample>> {
        self.dispatch(request, FilterKind::ExactPrice(price), cancel)
            .await
    }

    /// Search sorted by ascending price.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn filter_by_best_price(
        &self,
        request: Arc<ProductRequest>,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<ProductSample>> {
        self.dispatch(request, FilterKind::BestPrice, cancel).await
    }

    /// Runs `filter` on every requested market concurrently.
    ///
    /// Samples come back in the request's market order, limited to the
    /// markets that succeeded. Markets without an adapter are skipped.
    ///
    /// # Arguments
    ///
    /// * `request` - Validated search request, shared with every market task.
    /// * `filter` - Which adapter operation to run.
    /// * `cancel` - Parent of the per-market tokens. Tripping it aborts the
    ///   market tasks.
    ///
    /// # Errors
    ///
    /// - `DispatchError::ConnectionClosed` if `cancel` trips before the
    ///   result is assembled
    /// - `DispatchError::AllMarketsFailed` if no market produced a sample
    #[instrument(skip(self, request, cancel), fields(request_id = %request.id(), filter = %filter))]
    pub async fn dispatch(
        &self,
        request: Arc<ProductRequest>,
        filter: FilterKind,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<ProductSample>> {
        if cancel.is_cancelled() {
            return Err(DispatchError::ConnectionClosed);
        }

        let per_market = Duration::from_millis(self.config.per_market_timeout_ms);
        let mut tasks = JoinSet::new();
        let mut slots = HashMap::with_capacity(request.markets().len());

        for &market in request.markets() {
            let Some(adapter) = self.registry.get(market) else {
                warn!(error = %DispatchError::MarketNotConfigured(market), "skipping market");
                continue;
            };

            let request = Arc::clone(&request);
            let token = cancel.child_token();
            let handle = tasks.spawn(async move {
                timeout(per_market, run_filter(adapter.as_ref(), &request, filter, &token))
                    .await
                    .unwrap_or_else(|_| {
                        Err(MarketError::upstream_unavailable(format!(
                            "no answer within {}ms",
                            per_market.as_millis()
                        )))
                    })
            });
            slots.insert(handle.id(), (slots.len(), market));
        }

        let attempted = slots.len();
        // Dropping the set aborts every market task still running.
        let outcomes = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("client went away, abandoning dispatch");
                return Err(DispatchError::ConnectionClosed);
            }
            outcomes = join_in_order(tasks, &slots) => outcomes,
        };

        let mut samples = Vec::with_capacity(attempted);
        for (market, outcome) in outcomes {
            match outcome {
                Ok(Ok(sample)) => {
                    debug!(%market, products = sample.len(), "market answered");
                    samples.push(sample);
                }
                Ok(Err(error)) => warn!(%market, %error, status = ?error.status(), "market failed"),
                Err(error) => warn!(%market, %error, "market task aborted"),
            }
        }

        if samples.is_empty() {
            return Err(DispatchError::all_markets_failed(attempted));
        }

        info!(succeeded = samples.len(), attempted, "dispatch complete");
        Ok(samples)
    }
}

type MarketOutcome = Result<MarketResult<ProductSample>, JoinError>;

/// Waits for every task and returns the outcomes in spawn order.
async fn join_in_order(
    mut tasks: JoinSet<MarketResult<ProductSample>>,
    slots: &HashMap<task::Id, (usize, Market)>,
) -> Vec<(Market, MarketOutcome)> {
    let mut outcomes: Vec<Option<(Market, MarketOutcome)>> =
        (0..slots.len()).map(|_| None).collect();

    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, result)) => (id, Ok(result)),
            Err(error) => (error.id(), Err(error)),
        };
        if let Some(&(position, market)) = slots.get(&id)
            && let Some(slot) = outcomes.get_mut(position)
        {
            *slot = Some((market, outcome));
        }
    }

    outcomes.into_iter().flatten().collect()
}

async fn run_filter(
    adapter: &dyn MarketAdapter,
    request: &ProductRequest,
    filter: FilterKind,
    cancel: &CancellationToken,
) -> MarketResult<ProductSample> {
    match filter {
        FilterKind::Unfiltered => adapter.products(request, cancel).await,
        FilterKind::PriceRange(range) => {
            adapter
                .products_in_price_range(request, range, cancel)
                .await
        }
        FilterKind::ExactPrice(price) => {
            adapter
                .products_at_exact_price(request, price, cancel)
                .await
        }
        FilterKind::BestPrice => adapter.products_at_best_price(request, cancel).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SortMode;
    use crate::infrastructure::markets::testing::{StubAdapter, StubCall};

    fn request(markets: &[Market]) -> Arc<ProductRequest> {
        Arc::new(
            ProductRequest::builder("phone")
                .sort(SortMode::Rate)
                .markets(markets.iter().copied())
                .build(),
        )
    }

    fn dispatcher(adapters: Vec<Arc<StubAdapter>>, timeout_ms: u64) -> MarketDispatcher {
        let mut registry = MarketRegistry::new();
        for adapter in adapters {
            registry.register(adapter);
        }
        MarketDispatcher::new(
            Arc::new(registry),
            DispatchConfig::default().with_per_market_timeout(timeout_ms),
        )
    }

    mod aggregation {
        use super::*;

        #[tokio::test]
        async fn results_follow_request_order() {
            let dispatcher = dispatcher(
                vec![
                    Arc::new(StubAdapter::new(Market::Wildberries)),
                    Arc::new(StubAdapter::new(Market::MegaMarket)),
                ],
                1_000,
            );

            let samples = dispatcher
                .filter_by_markets(
                    request(&[Market::MegaMarket, Market::Wildberries]),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();

            let order: Vec<_> = samples.iter().map(|s| s.market()).collect();
            assert_eq!(order, vec![Some(Market::MegaMarket), Some(Market::Wildberries)]);
        }

        #[tokio::test]
        async fn partial_failure_is_success() {
            let dispatcher = dispatcher(
                vec![
                    Arc::new(StubAdapter::new(Market::Wildberries).failing("blocked")),
                    Arc::new(StubAdapter::new(Market::MegaMarket)),
                ],
                1_000,
            );

            let samples = dispatcher
                .filter_by_markets(
                    request(&[Market::Wildberries, Market::MegaMarket]),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();

            assert_eq!(samples.len(), 1);
            assert_eq!(samples[0].market(), Some(Market::MegaMarket));
        }

        #[tokio::test]
        async fn total_failure() {
            let dispatcher = dispatcher(
                vec![
                    Arc::new(StubAdapter::new(Market::Wildberries).failing("blocked")),
                    Arc::new(StubAdapter::new(Market::MegaMarket).failing("helper down")),
                ],
                1_000,
            );

            let err = dispatcher
                .filter_by_markets(
                    request(&[Market::Wildberries, Market::MegaMarket]),
                    &CancellationToken::new(),
                )
                .await
                .unwrap_err();

            assert_eq!(err, DispatchError::all_markets_failed(2));
        }

        #[tokio::test]
        async fn unconfigured_market_is_skipped() {
            let dispatcher = dispatcher(vec![Arc::new(StubAdapter::new(Market::MegaMarket))], 1_000);

            let samples = dispatcher
                .filter_by_markets(
                    request(&[Market::Wildberries, Market::MegaMarket]),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();
            assert_eq!(samples.len(), 1);

            let err = dispatcher
                .filter_by_markets(request(&[Market::Wildberries]), &CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(err, DispatchError::all_markets_failed(0));
        }

        #[tokio::test]
        async fn slow_market_times_out() {
            let dispatcher = dispatcher(
                vec![
                    Arc::new(
                        StubAdapter::new(Market::Wildberries).with_delay(Duration::from_secs(5)),
                    ),
                    Arc::new(StubAdapter::new(Market::MegaMarket)),
                ],
                50,
            );

            let samples = dispatcher
                .filter_by_markets(
                    request(&[Market::Wildberries, Market::MegaMarket]),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();
            assert_eq!(samples.len(), 1);
            assert_eq!(samples[0].market(), Some(Market::MegaMarket));
        }
    }

    mod filters {
        use super::*;

        #[tokio::test]
        async fn each_filter_reaches_its_operation() {
            let stub = Arc::new(StubAdapter::new(Market::Wildberries));
            let dispatcher = dispatcher(vec![Arc::clone(&stub)], 1_000);
            let req = request(&[Market::Wildberries]);
            let cancel = CancellationToken::new();
            let range = PriceRange::new(100, 500).unwrap();

            dispatcher
                .filter_by_markets(Arc::clone(&req), &cancel)
                .await
                .unwrap();
            dispatcher
                .filter_by_price_range(Arc::clone(&req), range, &cancel)
                .await
                .unwrap();
            dispatcher
                .filter_by_exact_price(Arc::clone(&req), 1000, &cancel)
                .await
                .unwrap();
            dispatcher
                .filter_by_best_price(req, &cancel)
                .await
                .unwrap();

            assert_eq!(
                stub.calls(),
                vec![
                    StubCall::Unfiltered(SortMode::Rate),
                    StubCall::Range(range),
                    StubCall::Range(PriceRange::new(1000, 1100).unwrap()),
                    StubCall::Best,
                ]
            );
        }

        #[test]
        fn filter_display() {
            assert_eq!(FilterKind::ExactPrice(10).to_string(), "exact-price 10");
            assert_eq!(FilterKind::BestPrice.to_string(), "best-price");
        }
    }

    mod cancellation {
        use super::*;

        #[tokio::test]
        async fn cancelled_before_start() {
            let stub = Arc::new(StubAdapter::new(Market::Wildberries));
            let dispatcher = dispatcher(vec![Arc::clone(&stub)], 1_000);
            let cancel = CancellationToken::new();
            cancel.cancel();

            let err = dispatcher
                .filter_by_markets(request(&[Market::Wildberries]), &cancel)
                .await
                .unwrap_err();

            assert_eq!(err, DispatchError::ConnectionClosed);
            assert!(stub.calls().is_empty());
        }

        #[tokio::test]
        async fn cancelled_while_waiting() {
            let stub = Arc::new(
                StubAdapter::new(Market::Wildberries).with_delay(Duration::from_secs(5)),
            );
            let dispatcher = dispatcher(vec![stub], 10_000);
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                trigger.cancel();
            });

            let err = dispatcher
                .filter_by_markets(request(&[Market::Wildberries]), &cancel)
                .await
                .unwrap_err();
            assert_eq!(err, DispatchError::ConnectionClosed);
        }

        #[tokio::test]
        async fn cancelled_dispatch_aborts_market_tasks() {
            let stub = Arc::new(
                StubAdapter::new(Market::Wildberries)
                    .with_delay(Duration::from_millis(200))
                    .ignoring_cancel(),
            );
            let dispatcher = dispatcher(vec![Arc::clone(&stub)], 10_000);
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                trigger.cancel();
            });

            let err = dispatcher
                .filter_by_markets(request(&[Market::Wildberries]), &cancel)
                .await
                .unwrap_err();
            assert_eq!(err, DispatchError::ConnectionClosed);

            tokio::time::sleep(Duration::from_millis(400)).await;
            assert_eq!(stub.calls().len(), 1);
            assert_eq!(stub.completed(), 0);
        }

        #[tokio::test]
        async fn dropped_dispatch_aborts_market_tasks() {
            let stub = Arc::new(
                StubAdapter::new(Market::Wildberries)
                    .with_delay(Duration::from_millis(200))
                    .ignoring_cancel(),
            );
            let dispatcher = dispatcher(vec![Arc::clone(&stub)], 10_000);

            let abandoned = tokio::time::timeout(
                Duration::from_millis(20),
                dispatcher.filter_by_markets(
                    request(&[Market::Wildberries]),
                    &CancellationToken::new(),
                ),
            )
            .await;
            assert!(abandoned.is_err());

            tokio::time::sleep(Duration::from_millis(400)).await;
            assert_eq!(stub.completed(), 0);
        }
    }
}
