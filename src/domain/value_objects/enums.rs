//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! This module provides the closed enumerations used throughout the price service:
//!
//! - [`Market`] - Supported marketplaces
//! - [`SortMode`] - Client-requested ordering of a sample
//! - [`AmountMode`] - How much of a marketplace listing to harvest
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace the service can query.
///
/// The set is closed: every value has exactly one adapter registered at
/// startup. A market missing from the registry is skipped, not rejected.
///
/// # Examples
///
/// ```
/// use price_service::domain::value_objects::enums::Market;
///
/// let market: Market = "wildberries".parse().unwrap();
/// assert_eq!(market, Market::Wildberries);
/// assert_eq!(market.to_string(), "Wildberries");
/// assert_eq!(market.wire_name(), "wildberries");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Market {
    /// Wildberries storefront, reached by scraping.
    Wildberries = 0,
    /// MegaMarket, reached through the helper service.
    MegaMarket = 1,
}

impl Market {
    /// All supported markets, in presentation order.
    pub const ALL: [Market; 2] = [Market::Wildberries, Market::MegaMarket];

    /// Returns the lowercase name used in query strings and response keys.
    #[inline]
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Wildberries => "wildberries",
            Self::MegaMarket => "megamarket",
        }
    }

    /// Returns the human-facing display name.
    #[inline]
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Wildberries => "Wildberries",
            Self::MegaMarket => "Megamarket",
        }
    }

    /// Returns the emoji designation shown by clients.
    #[inline]
    #[must_use]
    pub const fn designation(self) -> &'static str {
        match self {
            Self::Wildberries => "🌸",
            Self::MegaMarket => "🛍️",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Market {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wildberries" => Ok(Self::Wildberries),
            "megamarket" => Ok(Self::MegaMarket),
            _ => Err(ParseEnumError::InvalidValue("Market", s.to_string())),
        }
    }
}

/// Ordering of a product sample as requested by the client.
///
/// The wire values are the marketplace-neutral codes accepted on input;
/// adapters translate them into their own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Marketplace popularity order.
    #[default]
    Popular,
    /// Ascending price.
    PriceUp,
    /// Descending price.
    PriceDown,
    /// Newest listings first.
    Newly,
    /// Highest rated first.
    Rate,
}

impl SortMode {
    /// Returns the wire code of this sort mode.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::PriceUp => "priceup",
            Self::PriceDown => "pricedown",
            Self::Newly => "newly",
            Self::Rate => "rate",
        }
    }

    /// Parses a sort code, falling back to [`SortMode::Popular`] on
    /// anything unknown.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(Self::Popular),
            "priceup" => Ok(Self::PriceUp),
            "pricedown" => Ok(Self::PriceDown),
            "newly" => Ok(Self::Newly),
            "rate" => Ok(Self::Rate),
            _ => Err(ParseEnumError::InvalidValue("SortMode", s.to_string())),
        }
    }
}

/// How much of a listing an adapter harvests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountMode {
    /// A fixed minimal batch.
    #[default]
    Min,
    /// Exhaustive: scroll lazily loaded content before harvesting.
    Max,
}

impl AmountMode {
    /// Returns the wire code of this amount mode.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Returns true for the exhaustive mode.
    #[inline]
    #[must_use]
    pub const fn is_max(self) -> bool {
        matches!(self, Self::Max)
    }

    /// Parses an amount code, falling back to [`AmountMode::Min`].
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for AmountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmountMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            _ => Err(ParseEnumError::InvalidValue("AmountMode", s.to_string())),
        }
    }
}

/// Error type for parsing enum values from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}
