//! # Price Value Object
//!
//! Normalized marketplace price with a derived discount percentage.
//!
//! # Examples
//!
//! ```
//! use price_service::domain::value_objects::price::Price;
//!
//! let price = Price::new(15000, 5000);
//! assert_eq!(price.discount(), 66);
//!
//! let broken = Price::new(0, 10);
//! assert!(broken.is_zero());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A product price as shown on a marketplace.
///
/// # Invariants
///
/// Either every field is zero, or `0 < discount_price <= base_price` and
/// `discount == floor((base_price - discount_price) * 100 / base_price)`.
/// Upstream data that breaks the ordering collapses to the zero sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Price {
    base_price: i64,
    discount_price: i64,
    discount: i64,
}

impl Price {
    /// The all-zero sentinel.
    pub const ZERO: Self = Self {
        base_price: 0,
        discount_price: 0,
        discount: 0,
    };

    /// Builds a price from the listed and the discounted amount.
    ///
    /// Returns [`Price::ZERO`] when either amount is non-positive or the
    /// discounted amount exceeds the listed one.
    #[must_use]
    pub fn new(base_price: i64, discount_price: i64) -> Self {
        if base_price <= 0 || discount_price <= 0 || discount_price > base_price {
            return Self::ZERO;
        }
        let discount = (base_price - discount_price).saturating_mul(100) / base_price;
        Self {
            base_price,
            discount_price,
            discount,
        }
    }

    /// Returns the listed price.
    #[inline]
    #[must_use]
    pub const fn base_price(&self) -> i64 {
        self.base_price
    }

    /// Returns the price after discount.
    #[inline]
    #[must_use]
    pub const fn discount_price(&self) -> i64 {
        self.discount_price
    }

    /// Returns the discount in whole percent.
    #[inline]
    #[must_use]
    pub const fn discount(&self) -> i64 {
        self.discount
    }

    /// Returns true for the zero sentinel.
    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.base_price == 0 && self.discount_price == 0 && self.discount == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (was {}, -{}%)",
            self.discount_price, self.base_price, self.discount
        )
    }
}
