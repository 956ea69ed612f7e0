//! # Domain Layer
//!
//! Marketplace-neutral product model.
//!
//! This layer contains:
//! - **Entities**: Product, per-market product sample, canonical request
//! - **Value Objects**: Market and mode enums, price, price range

pub mod entities;
pub mod value_objects;
