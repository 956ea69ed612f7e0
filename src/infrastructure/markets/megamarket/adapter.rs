//! # MegaMarket Adapter
//!
//! Delegate-style [`MarketAdapter`]: MegaMarket blocks direct scraping, so
//! the search is handed to a helper service that returns the catalog's own
//! JSON. This adapter only shapes the request and normalizes the answer.

use super::dto::{HelperRequest, HelperResponse};
use super::urls::{DEFAULT_ORIGIN, catalog_url, sort_code};
use crate::domain::entities::{Product, ProductRequest, ProductSample};
use crate::domain::value_objects::{AmountMode, Market, Price, PriceRange, SortMode};
use crate::infrastructure::markets::error::{MarketError, MarketResult};
use crate::infrastructure::markets::http_client::HttpClient;
use crate::infrastructure::markets::traits::MarketAdapter;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Settings of the MegaMarket adapter.
#[derive(Debug, Clone)]
pub struct MegaMarketSettings {
    /// `host:port` of the helper service.
    pub helper_address: String,
    /// Storefront origin used for catalog links.
    pub origin: String,
    /// HTTP timeout for helper calls.
    pub timeout_ms: u64,
    /// Number of items considered for [`AmountMode::Min`].
    pub min_amount: usize,
}

impl Default for MegaMarketSettings {
    fn default() -> Self {
        Self {
            helper_address: "127.0.0.1:8000".to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            timeout_ms: 60_000,
            min_amount: 15,
        }
    }
}

/// MegaMarket market adapter.
#[derive(Debug)]
pub struct MegaMarketAdapter {
    settings: MegaMarketSettings,
    http: HttpClient,
    endpoint: String,
}

impl MegaMarketAdapter {
    /// Creates the adapter.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Internal` if the HTTP client cannot be built.
    pub fn new(settings: MegaMarketSettings) -> MarketResult<Self> {
        let http = HttpClient::new(settings.timeout_ms)?;
        let endpoint = format!("http://{}/mmarket", settings.helper_address);
        Ok(Self {
            settings,
            http,
            endpoint,
        })
    }

    /// Returns the helper endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip(self, request, cancel), fields(request_id = %request.id()))]
    async fn retrieve(
        &self,
        request: &ProductRequest,
        range: Option<PriceRange>,
        sort: SortMode,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        let catalog = catalog_url(
            &self.settings.origin,
            request.query(),
            request.sample(),
            sort,
            range,
        );

        if cancel.is_cancelled() {
            return Err(MarketError::ConnectionClosed);
        }

        let body = HelperRequest::new(request.query(), request.sample(), sort_code(sort), range);
        let response: HelperResponse = self.http.post_json(&self.endpoint, &body).await?;
        debug!(items = response.items.len(), "megamarket helper answered");

        let considered = match request.amount() {
            AmountMode::Min => self.settings.min_amount.min(response.items.len()),
            AmountMode::Max => response.items.len(),
        };

        let products = response
            .items
            .into_iter()
            .take(considered)
            .filter(|item| item.final_price != 0)
            .map(|item| {
                Product::new(
                    item.goods.title,
                    item.goods.brand,
                    item.favorite_offer.merchant_name,
                    Price::new(item.price, item.final_price),
                )
                .with_url(item.goods.web_url)
                .with_image_link(item.goods.title_image)
            })
            .collect();

        Ok(ProductSample::new(Market::MegaMarket, products, catalog))
    }
}

#[async_trait]
impl MarketAdapter for MegaMarketAdapter {
    fn market(&self) -> Market {
        Market::MegaMarket
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
