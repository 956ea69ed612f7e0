//! # Domain Entities
//!
//! ## Entities
//!
//! - [`Product`]: One normalized listing
//! - [`ProductSample`]: The products one market returned
//! - [`ProductRequest`]: Canonical search request shared by all adapters

pub mod product;
pub mod product_request;
pub mod product_sample;

pub use product::{Product, ProductLinks};
pub use product_request::{ProductRequest, ProductRequestBuilder};
pub use product_sample::{Currency, ProductSample};
