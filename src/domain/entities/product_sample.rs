//! # Product Sample
//!
//! The products one marketplace returned for one request.

use super::product::Product;
use crate::domain::value_objects::Market;
use serde::{Deserialize, Serialize};

/// Currency of all sample prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Russian rouble.
    #[default]
    Rub,
}

/// Products harvested from one market, with a link reproducing the query
/// on the marketplace's own catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSample {
    products: Vec<Product>,
    market: String,
    main_products_sample: String,
    currency: Currency,
    #[serde(skip)]
    source: Option<Market>,
}

impl ProductSample {
    /// Creates a sample for `market`.
    #[must_use]
    pub fn new(market: Market, products: Vec<Product>, catalog_url: impl Into<String>) -> Self {
        Self {
            products,
            market: market.display_name().to_string(),
            main_products_sample: catalog_url.into(),
            currency: Currency::Rub,
            source: Some(market),
        }
    }

    /// Returns the products.
    #[inline]
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Returns the market display name.
    #[inline]
    #[must_use]
    pub fn market_name(&self) -> &str {
        &self.market
    }

    /// Returns the market the sample came from, when known.
    #[inline]
    #[must_use]
    pub fn market(&self) -> Option<Market> {
        self.source
            .or_else(|| Market::ALL.into_iter().find(|m| m.display_name() == self.market))
    }

    /// Returns the human-facing catalog URL.
    #[inline]
    #[must_use]
    pub fn catalog_url(&self) -> &str {
        &self.main_products_sample
    }

    /// Returns the currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the number of products.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the sample holds no products.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
