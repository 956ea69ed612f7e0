//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Domain Enums
//!
//! - [`Market`]: Supported marketplaces
//! - [`SortMode`]: Requested sample ordering
//! - [`AmountMode`]: Minimal batch or exhaustive harvest
//!
//! ## Prices
//!
//! - [`Price`]: Listed and discounted price with derived discount
//! - [`PriceRange`]: Inclusive price window

pub mod enums;
pub mod price;
pub mod price_range;

pub use enums::{AmountMode, Market, ParseEnumError, SortMode};
pub use price::Price;
pub use price_range::{PriceRange, PriceRangeError};
