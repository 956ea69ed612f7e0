//! # Price Range
//!
//! Inclusive price bounds used by the range and exact-price filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Uplift applied to an exact price to build its search window.
const EXACT_PRICE_UPLIFT: f32 = 1.1;

/// Errors raised when constructing a [`PriceRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceRangeError {
    /// Upper bound must be strictly positive.
    #[error("upper price bound must be positive")]
    NonPositiveUpper,

    /// Lower bound exceeds the upper bound.
    #[error("lower price bound {down} exceeds upper bound {up}")]
    Inverted {
        /// Lower bound.
        down: u64,
        /// Upper bound.
        up: u64,
    },
}

/// Inclusive `[down, up]` price window in whole roubles.
///
/// # Invariants
///
/// - `up > 0`
/// - `down <= up`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRange {
    down: u64,
    up: u64,
}

impl PriceRange {
    /// Creates a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`PriceRangeError`] when `up == 0` or `down > up`.
    pub fn new(down: u64, up: u64) -> Result<Self, PriceRangeError> {
        if up == 0 {
            return Err(PriceRangeError::NonPositiveUpper);
        }
        if down > up {
            return Err(PriceRangeError::Inverted { down, up });
        }
        Ok(Self { down, up })
    }

    /// Builds the search window for an exact price: `[p, floor(p * 1.1)]`.
    ///
    /// The uplift is computed in single precision and truncated, so
    /// `around_exact(1000)` is `[1000, 1100]`.
    #[must_use]
    pub fn around_exact(price: u64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let up = (price as f32 * EXACT_PRICE_UPLIFT) as u64;
        Self {
            down: price,
            up: up.max(price),
        }
    }

    /// Returns the lower bound.
    #[inline]
    #[must_use]
    pub const fn down(&self) -> u64 {
        self.down
    }

    /// Returns the upper bound.
    #[inline]
    #[must_use]
    pub const fn up(&self) -> u64 {
        self.up
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.down, self.up)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        let range = PriceRange::new(100, 200).unwrap();
        assert_eq!(range.down(), 100);
        assert_eq!(range.up(), 200);
    }

    #[test]
    fn zero_lower_bound_is_allowed() {
        assert!(PriceRange::new(0, 1).is_ok());
        assert!(PriceRange::new(5, 5).is_ok());
    }

    #[test]
    fn rejects_zero_upper() {
        assert_eq!(PriceRange::new(0, 0), Err(PriceRangeError::NonPositiveUpper));
    }

    #[test]
    fn rejects_inverted() {
        assert_eq!(
            PriceRange::new(300, 200),
            Err(PriceRangeError::Inverted { down: 300, up: 200 })
        );
    }

    #[test]
    fn around_exact_uplifts_ten_percent() {
        let range = PriceRange::around_exact(1000);
        assert_eq!(range.down(), 1000);
        assert_eq!(range.up(), 1100);
    }

    #[test]
    fn around_exact_truncates() {
        // 15 * 1.1 in f32 is 16.5
        assert_eq!(PriceRange::around_exact(15).up(), 16);
        assert_eq!(PriceRange::around_exact(1).up(), 1);
    }
}
