//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - [`markets`]: marketplace adapters and their registry
//! - [`browser`]: WebDriver-backed browsing sessions
//! - [`messaging`]: message sink for asynchronous results

pub mod browser;
pub mod markets;
pub mod messaging;
