//! # Wildberries
//!
//! Scrape adapter for the Wildberries storefront.
//!
//! Product data comes from the storefront's JSON search API. Thumbnails are
//! only present in the rendered catalog page, so they are harvested through
//! a browser session when the client asks for images.

pub mod adapter;
pub mod images;
pub mod urls;

pub use adapter::{ScrollPlan, WildberriesAdapter, WildberriesSettings};
pub use urls::WildberriesUrls;
