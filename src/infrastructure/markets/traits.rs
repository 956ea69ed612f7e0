//! # Market Adapter Trait
//!
//! Port definition for marketplace integrations.
//!
//! This module defines the [`MarketAdapter`] trait that every marketplace
//! integration implements. Each adapter turns one [`ProductRequest`] into one
//! [`ProductSample`] for one of four filter kinds.
//!
//! # Examples
//!
//! ```ignore
//! use price_service::infrastructure::markets::traits::MarketAdapter;
//!
//! struct MyMarketAdapter { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl MarketAdapter for MyMarketAdapter {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::entities::{ProductRequest, ProductSample};
use crate::domain::value_objects::{Market, PriceRange};
use crate::infrastructure::markets::error::MarketResult;
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Trait defining the interface for market adapters.
///
/// # Cancellation
///
/// Every operation receives the caller's cancellation token. Adapters check
/// it before any network call they are about to start and return
/// `MarketError::ConnectionClosed` once it is tripped.
///
/// # Error Handling
///
/// Methods return `MarketResult<T>`. Adapters map transport failures to
/// `UpstreamUnavailable` and malformed bodies to `Decode`; they never return
/// an empty sample in place of an error.
#[async_trait]
pub trait MarketAdapter: Send + Sync + fmt::Debug {
    /// Returns the market this adapter serves.
    fn market(&self) -> Market;

    /// Retrieves products with the client's sort and no price filter.
    ///
    /// # Errors
    ///
    /// - `MarketError::UpstreamUnavailable` - Upstream unreachable or non-2xx
    /// - `MarketError::Decode` - Upstream body malformed
    /// - `MarketError::ConnectionClosed` - Caller cancelled
    async fn products(
        &self,
        request: &ProductRequest,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample>;

    /// Retrieves products priced inside `range`.
    ///
    /// # Errors
    ///
    /// Same as [`products`](Self::products).
    async fn products_in_price_range(
        &self,
        request: &ProductRequest,
        range: PriceRange,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample>;

    /// Retrieves products priced around `price`, using
    /// [`PriceRange::around_exact`].
    ///
    /// # Errors
    ///
    /// Same as [`products`](Self::products).
    async fn products_at_exact_price(
        &self,
        request: &ProductRequest,
        price: u64,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample> {
        self.products_in_price_range(request, PriceRange::around_exact(price), cancel)
            .await
    }

    /// Retrieves the cheapest products: the client's sort is replaced with
    /// ascending price.
    ///
    /// # Errors
    ///
    /// Same as [`products`](Self::products).
    async fn products_at_best_price(
        &self,
        request: &ProductRequest,
        cancel: &CancellationToken,
    ) -> MarketResult<ProductSample>;
}
