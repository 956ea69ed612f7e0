//! # Product Request
//!
//! Canonical, validated form of one inbound product search.
//!
//! A request is built once per inbound call and then shared read-only
//! (behind an `Arc`) with every market adapter taking part in it.
//!
//! # Examples
//!
//! ```
//! use price_service::domain::entities::product_request::ProductRequest;
//! use price_service::domain::value_objects::{AmountMode, Market, SortMode};
//!
//! let request = ProductRequest::builder("iphone 15")
//!     .markets([Market::MegaMarket, Market::Wildberries, Market::MegaMarket])
//!     .sort(SortMode::PriceUp)
//!     .amount(AmountMode::Max)
//!     .build();
//!
//! assert_eq!(request.markets(), &[Market::MegaMarket, Market::Wildberries]);
//! assert_eq!(request.sample(), 1);
//! ```

use crate::domain::value_objects::{AmountMode, Market, SortMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An immutable product search request.
///
/// # Invariants
///
/// - `sample >= 1`
/// - `markets` holds no duplicates and keeps the client's order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRequest {
    id: Uuid,
    query: String,
    sample: u32,
    sort: SortMode,
    amount: AmountMode,
    no_image: bool,
    markets: Vec<Market>,
}

impl ProductRequest {
    /// Starts building a request for `query`.
    #[must_use]
    pub fn builder(query: impl Into<String>) -> ProductRequestBuilder {
        ProductRequestBuilder::new(query)
    }

    /// Returns the correlation id assigned at construction.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the free-text query.
    #[inline]
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the requested page, starting at 1.
    #[inline]
    #[must_use]
    pub fn sample(&self) -> u32 {
        self.sample
    }

    /// Returns the requested sort order.
    #[inline]
    #[must_use]
    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Returns the amount mode.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> AmountMode {
        self.amount
    }

    /// Returns true when image links should not be harvested.
    #[inline]
    #[must_use]
    pub fn no_image(&self) -> bool {
        self.no_image
    }

    /// Returns the requested markets in client order.
    #[inline]
    #[must_use]
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }
}

impl fmt::Display for ProductRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProductRequest({:?} page {} sort {} amount {})",
            self.query, self.sample, self.sort, self.amount
        )
    }
}

/// Builder for [`ProductRequest`].
#[derive(Debug, Clone)]
pub struct ProductRequestBuilder {
    query: String,
    sample: u32,
    sort: SortMode,
    amount: AmountMode,
    no_image: bool,
    markets: Vec<Market>,
}

impl ProductRequestBuilder {
    /// Creates a builder with defaults: page 1, popular sort, minimal
    /// amount, images off, no markets.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sample: 1,
            sort: SortMode::default(),
            amount: AmountMode::default(),
            no_image: true,
            markets: Vec::new(),
        }
    }

    /// Sets the page. Zero is raised to 1.
    #[must_use]
    pub fn sample(mut self, sample: u32) -> Self {
        self.sample = sample.max(1);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the amount mode.
    #[must_use]
    pub fn amount(mut self, amount: AmountMode) -> Self {
        self.amount = amount;
        self
    }

    /// Sets whether image links are skipped.
    #[must_use]
    pub fn no_image(mut self, no_image: bool) -> Self {
        self.no_image = no_image;
        self
    }

    /// Appends markets, dropping repeats.
    #[must_use]
    pub fn markets(mut self, markets: impl IntoIterator<Item = Market>) -> Self {
        for market in markets {
            if !self.markets.contains(&market) {
                self.markets.push(market);
            }
        }
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> ProductRequest {
        ProductRequest {
            id: Uuid::new_v4(),
            query: self.query,
            sample: self.sample,
            sort: self.sort,
            amount: self.amount,
            no_image: self.no_image,
            markets: self.markets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let request = ProductRequest::builder("q").build();
        assert_eq!(request.sample(), 1);
        assert_eq!(request.sort(), SortMode::Popular);
        assert_eq!(request.amount(), AmountMode::Min);
        assert!(request.no_image());
        assert!(request.markets().is_empty());
    }

    #[test]
    fn zero_sample_is_raised() {
        let request = ProductRequest::builder("q").sample(0).build();
        assert_eq!(request.sample(), 1);
    }

    #[test]
    fn markets_are_deduplicated_in_order() {
        let request = ProductRequest::builder("q")
            .markets([Market::Wildberries, Market::MegaMarket])
            .markets([Market::Wildberries])
            .build();
        assert_eq!(request.markets(), &[Market::Wildberries, Market::MegaMarket]);
    }
}
