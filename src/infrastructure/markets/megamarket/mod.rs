//! # MegaMarket
//!
//! Delegate adapter for the MegaMarket storefront. Searches are forwarded
//! to an external helper service over HTTP.

pub mod adapter;
pub mod dto;
pub mod urls;

pub use adapter::{MegaMarketAdapter, MegaMarketSettings};
