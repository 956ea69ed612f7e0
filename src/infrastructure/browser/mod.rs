//! # Headless Browser
//!
//! Browser sessions used by scrape adapters to render catalog pages whose
//! content only appears after client-side scripts run.
//!
//! - [`BrowserPool`] / [`BrowsingSession`]: ports
//! - [`WebDriverPool`]: W3C WebDriver implementation over HTTP

pub mod error;
pub mod traits;
pub mod webdriver;

pub use error::{BrowserError, BrowserResult};
pub use traits::{BrowserPool, BrowsingSession};
pub use webdriver::{WebDriverPool, WebDriverSession};
