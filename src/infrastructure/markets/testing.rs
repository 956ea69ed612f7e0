//! In-memory [`MarketAdapter`] used by tests across the crate.

use crate::domain::entities::{Product, ProductRequest, ProductSample};
use crate::domain::value_objects::{Market, Price, PriceRange, SortMode};
use crate::infrastructure::markets::error::{MarketError, MarketResult};
use crate::infrastructure::markets::traits::MarketAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Call observed by a [`StubAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubCall {
    Unfiltered(SortMode),
    Range(PriceRange),
    Best,
}

/// Adapter answering from a fixed product list.
#[derive(Debug)]
pub struct StubAdapter {
    market: Market,
    products: Vec<Product>,
    failure: Option<String>,
    delay: Option<Duration>,
    ignores_cancel: bool,
    calls: Mutex<Vec<StubCall>>,
    completed: Mutex<usize>,
}

impl StubAdapter {
    pub fn new(market: Market) -> Self {
        Self {
            market,
            products: vec![
                Product::new("Phone", "Acme", "Acme Store", Price::new(2000, 1500))
                    .with_url(format!("https://{}/1", market.wire_name())),
            ],
            failure: None,
            delay: None,
            ignores_cancel: false,
            calls: Mutex::new(Vec::new()),
            completed: Mutex::new(0),
        }
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleeps through the delay even when the token trips.
    pub fn ignoring_cancel(mut self) -> Self {
        self.ignores_cancel = true;
        self
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().clone()
    }

    /// Calls that ran to the end of their delay.
    pub fn completed(&self) -> usize {
        *self.completed.lock()
    }

    async fn answer(&self, call: StubCall, cancel: &CancellationToken) -> MarketResult<ProductSample> {
        self.calls.lock().push(call);
        if let Some(delay) = self.delay {
            if self.ignores_cancel {
                tokio::time::sleep(delay).await;
            } else {
                tokio::select! {
                    () = cancel.cancelled() => return Err(MarketError::ConnectionClosed),
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
        *self.completed.lock() += 1;
        if let Some(message) = &self.failure {
            return Err(MarketError::upstream_unavailable(message.clone()));
        }
        Ok(ProductSample::new(
            self.market,
            self.products.clone(),
            format!("https://{}/catalog", self.market.wire_name()),
        ))
    }
}

#[async_trait]
impl MarketAdapter for StubAdapter {
    fn market(&self) -> Market {
        self.market
    }

    async fn products(
        &self,
        request: &ProductRequest,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.answer(StubCall::Unfiltered(request.sort()), cancel).await
    }

    async fn products_in_price_range(
        &self,
        _request: &ProductRequest,
        range: PriceRange,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.answer(StubCall::Range(range), cancel).await
    }

    async fn products_at_best_price(
        &self,
        _request: &ProductRequest,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.answer(StubCall::Best, cancel).await
    }
}
