//! # Product
//!
//! One normalized marketplace listing.

use crate::domain::value_objects::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Links attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLinks {
    /// Product page on the marketplace.
    pub url: String,
    /// Thumbnail image, empty when images were not requested or not found.
    pub image_link: String,
}

/// A product listing normalized across marketplaces.
///
/// # Examples
///
/// ```
/// use price_service::domain::entities::product::Product;
/// use price_service::domain::value_objects::Price;
///
/// let product = Product::new("Phone", "Acme", "Acme Store", Price::new(1000, 900))
///     .with_url("https://example.com/p/1");
/// assert_eq!(product.price().discount(), 10);
/// assert!(product.links().image_link.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    name: String,
    brand: String,
    price: Price,
    supplier: String,
    related_links: ProductLinks,
}

impl Product {
    /// Creates a product without links.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        supplier: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            price,
            supplier: supplier.into(),
            related_links: ProductLinks::default(),
        }
    }

    /// Sets the product page URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.related_links.url = url.into();
        self
    }

    /// Sets the thumbnail link.
    #[must_use]
    pub fn with_image_link(mut self, image_link: impl Into<String>) -> Self {
        self.related_links.image_link = image_link.into();
        self
    }

    /// Returns the product name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the brand.
    #[inline]
    #[must_use]
    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Returns the supplier or merchant.
    #[inline]
    #[must_use]
    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    /// Returns the price.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Returns the related links.
    #[inline]
    #[must_use]
    pub fn links(&self) -> &ProductLinks {
        &self.related_links
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} at {}", self.name, self.brand, self.price)
    }
}
