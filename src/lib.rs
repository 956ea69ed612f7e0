//! # Price Service
//!
//! Multi-marketplace product search and price aggregation.
//!
//! A single HTTP request fans out to several online marketplaces at once;
//! each market answers through its own adapter and the per-market samples
//! are returned together, keyed by market.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain`): Products, samples, canonical requests, prices
//! - **Application Layer** (`application`): Dispatcher, async publisher, retry
//! - **Infrastructure Layer** (`infrastructure`): Market adapters, headless
//!   browser, message broker
//! - **API Layer** (`api`): REST interface
//!
//! ## Example
//!
//! ```rust,ignore
//! use price_service::application::services::{DispatchConfig, MarketDispatcher};
//! use price_service::domain::entities::ProductRequest;
//! use price_service::domain::value_objects::Market;
//!
//! let request = ProductRequest::builder("iphone").markets([Market::Wildberries]).build();
//! let samples = dispatcher
//!     .filter_by_best_price(Arc::new(request), &CancellationToken::new())
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
