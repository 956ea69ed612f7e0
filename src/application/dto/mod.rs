//! # Data Transfer Objects
//!
//! Wire shapes exchanged with clients and with the message broker.

pub mod product_dto;

pub use product_dto::{AsyncRequestBody, MarketView, ProductResponse, SupportedMarkets};
