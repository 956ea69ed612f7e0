//! # API Layer
//!
//! External interfaces of the price service.
//!
//! - **REST**: product search and service information over HTTP
//!
//! Asynchronous results leave through the message broker instead of this
//! layer; see `application::services::publisher`.

pub mod rest;
