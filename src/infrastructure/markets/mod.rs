//! # Markets
//!
//! Marketplace adapters and the registry the dispatcher reads them from.
//!
//! - [`wildberries`]: scrape adapter, JSON search API plus browser thumbnails
//! - [`megamarket`]: delegate adapter backed by a helper service

pub mod error;
pub mod http_client;
pub mod megamarket;
pub mod registry;
pub mod traits;
pub mod wildberries;

#[cfg(test)]
#[allow(missing_docs, dead_code)]
pub(crate) mod testing;

pub use error::{MarketError, MarketResult};
pub use http_client::HttpClient;
pub use megamarket::{MegaMarketAdapter, MegaMarketSettings};
pub use registry::MarketRegistry;
pub use traits::MarketAdapter;
pub use wildberries::{WildberriesAdapter, WildberriesSettings};
