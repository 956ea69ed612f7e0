//! # Wildberries Adapter
//!
//! Scrape-style [`MarketAdapter`]: pages through the storefront's search
//! API until a large enough batch arrives, then optionally renders the
//! human-facing catalog in a browser session to harvest thumbnails.

use super::images::extract_image_links;
use super::urls::WildberriesUrls;
use crate::domain::entities::{Product, ProductRequest, ProductSample};
use crate::domain::value_objects::{AmountMode, Market, Price, PriceRange, SortMode};
use crate::infrastructure::browser::{BrowserPool, BrowsingSession};
use crate::infrastructure::markets::error::{MarketError, MarketResult};
use crate::infrastructure::markets::http_client::HttpClient;
use crate::infrastructure::markets::traits::MarketAdapter;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Selector of the rendered product grid.
const PRODUCT_GRID: &str = "[class='product-card-list']";

// ============================================================================
// Settings
// ============================================================================

/// Timing of the lazy-loading scroll performed for [`AmountMode::Max`].
///
/// The session first settles for `settle_ms`, then scrolls to the bottom
/// once per entry of `step_pauses_ms`, pausing for that entry afterwards.
/// Every pause is extended by `load_coeff_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollPlan {
    /// Initial pause after navigation.
    pub settle_ms: u64,
    /// Pause after each scroll.
    pub step_pauses_ms: Vec<u64>,
    /// Extra pause added to every sleep on slow hosts.
    pub load_coeff_ms: u64,
}

impl Default for ScrollPlan {
    fn default() -> Self {
        Self {
            settle_ms: 3000,
            step_pauses_ms: vec![1000, 1000, 1000, 4000],
            load_coeff_ms: 0,
        }
    }
}

impl ScrollPlan {
    /// A plan with the default shape and no pauses.
    #[cfg(test)]
    pub(crate) fn instant() -> Self {
        Self {
            settle_ms: 0,
            step_pauses_ms: vec![0; 4],
            load_coeff_ms: 0,
        }
    }

    fn pause(&self, ms: u64) -> Duration {
        Duration::from_millis(ms.saturating_add(self.load_coeff_ms))
    }
}

/// Settings of the Wildberries adapter.
#[derive(Debug, Clone)]
pub struct WildberriesSettings {
    /// Endpoint URLs.
    pub urls: WildberriesUrls,
    /// HTTP timeout for search API calls.
    pub timeout_ms: u64,
    /// A batch at least this large ends pagination.
    pub min_batch: usize,
    /// Maximum number of search API calls per retrieval.
    pub max_attempts: u32,
    /// How long to wait for the product grid to render.
    pub wait_timeout_ms: u64,
    /// Scroll timing for exhaustive harvesting.
    pub scroll: ScrollPlan,
}

impl Default for WildberriesSettings {
    fn default() -> Self {
        Self {
            urls: WildberriesUrls::default(),
            timeout_ms: 10_000,
            min_batch: 10,
            max_attempts: 10,
            wait_timeout_ms: 15_000,
            scroll: ScrollPlan::default(),
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: SearchData,
}

#[derive(Debug, Default, Deserialize)]
struct SearchData {
    #[serde(default)]
    products: Vec<SearchProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchProduct {
    id: u64,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    supplier: String,
    #[serde(default)]
    sizes: Vec<SearchSize>,
}

#[derive(Debug, Deserialize)]
struct SearchSize {
    price: SearchPrice,
}

/// Prices in kopecks.
#[derive(Debug, Deserialize)]
struct SearchPrice {
    #[serde(default)]
    basic: i64,
    #[serde(default)]
    total: i64,
}

impl SearchProduct {
    fn price(&self) -> Price {
        self.sizes
            .first()
            .map(|size| Price::new(size.price.basic / 100, size.price.total / 100))
            .unwrap_or(Price::ZERO)
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Wildberries market adapter.
#[derive(Debug)]
pub struct WildberriesAdapter {
    settings: WildberriesSettings,
    http: HttpClient,
    session: Option<Mutex<Arc<dyn BrowsingSession>>>,
}

impl WildberriesAdapter {
    /// Creates an adapter without a browser session. Image links are then
    /// never harvested.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Internal` if the HTTP client cannot be built.
    pub fn new(settings: WildberriesSettings) -> MarketResult<Self> {
        let http = HttpClient::new(settings.timeout_ms)?;
        Ok(Self {
            settings,
            http,
            session: None,
        })
    }

    /// Creates an adapter holding a fresh session from `pool`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Browser` if no session can be opened.
    pub async fn connect(
        settings: WildberriesSettings,
        pool: &dyn BrowserPool,
    ) -> MarketResult<Self> {
        let session = pool.new_session().await?;
        Ok(Self::new(settings)?.with_session(session))
    }

    /// Attaches a browsing session used for image harvesting.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn BrowsingSession>) -> Self {
        self.session = Some(Mutex::new(session));
        self
    }

    /// Returns the adapter settings.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &WildberriesSettings {
        &self.settings
    }

    /// Pages the search API until a batch of at least `min_batch` products
    /// arrives. Each call replaces the previous batch.
    async fn collect_batch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> MarketResult<Vec<SearchProduct>> {
        let mut last_len = 0;
        for attempt in 1..=self.settings.max_attempts {
            if cancel.is_cancelled() {
                return Err(MarketError::ConnectionClosed);
            }

            let response: SearchResponse = self.http.get_json(url).await?;
            let batch = response.data.products;
            debug!(attempt, size = batch.len(), "wildberries search batch");

            if batch.len() >= self.settings.min_batch {
                return Ok(batch);
            }
            last_len = batch.len();
        }

        Err(MarketError::SampleExhausted {
            attempts: self.settings.max_attempts,
            last_len,
        })
    }

    /// Renders the catalog page and returns thumbnail links in grid order.
    async fn harvest_images(
        &self,
        catalog_url: &str,
        amount: AmountMode,
    ) -> MarketResult<Vec<String>> {
        let Some(session) = &self.session else {
            warn!("images requested but no browser session is attached");
            return Ok(Vec::new());
        };
        let session = session.lock().await;

        session.navigate(catalog_url).await?;
        session
            .wait_for(
                PRODUCT_GRID,
                Duration::from_millis(self.settings.wait_timeout_ms),
            )
            .await?;

        if amount.is_max() {
            let plan = &self.settings.scroll;
            tokio::time::sleep(plan.pause(plan.settle_ms)).await;
            for pause in &plan.step_pauses_ms {
                session.scroll_to_bottom().await?;
                tokio::time::sleep(plan.pause(*pause)).await;
            }
        }

        let html = session.inner_html(PRODUCT_GRID).await?;
        Ok(extract_image_links(&html))
    }

    #[instrument(skip(self, request, cancel), fields(request_id = %request.id()))]
    async fn retrieve(
        &self,
        request: &ProductRequest,
        range: Option<PriceRange>,
        sort: SortMode,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        let urls = &self.settings.urls;
        let search_url = urls.search_url(request, range, sort);
        let catalog_url = urls.catalog_url(request, range, sort);

        let batch = self.collect_batch(&search_url, cancel).await?;

        if cancel.is_cancelled() {
            return Err(MarketError::ConnectionClosed);
        }

        let images = if request.no_image() {
            Vec::new()
        } else {
            self.harvest_images(&catalog_url, request.amount()).await?
        };

        let mut images = images.into_iter();
        let products = batch
            .iter()
            .map(|item| {
                let product = Product::new(&item.name, &item.brand, &item.supplier, item.price())
                    .with_url(urls.product_url(item.id));
                match images.next() {
                    Some(image) => product.with_image_link(image),
                    None => product,
                }
            })
            .collect();

        Ok(ProductSample::new(Market::Wildberries, products, catalog_url))
    }
}

#[async_trait]
impl MarketAdapter for WildberriesAdapter {
    fn market(&self) -> Market {
        Market::Wildberries
    }

    async fn products(
        &self,
        request: &ProductRequest,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.retrieve(request, None, request.sort(), cancel).await
    }

    async fn products_in_price_range(
        &self,
        request: &ProductRequest,
        range: PriceRange,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.retrieve(request, Some(range), request.sort(), cancel)
            .await
    }

    async fn products_at_best_price(
        &self,
        request: &ProductRequest,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.retrieve(request, None, SortMode::PriceUp, cancel).await
    }
}
