//! # Configuration
//!
//! Application configuration loading and management.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override earlier):
//! 1. Default values
//! 2. Configuration file (if exists)
//! 3. `.env` file in the working directory (if exists)
//! 4. Environment variables (prefixed with `PRICE_SERVICE_`)
//!
//! Variables from `.env` never replace variables already set in the process
//! environment.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PRICE_SERVICE_CONFIG_FILE` | Configuration file path | `config.toml` |
//! | `PRICE_SERVICE_REST_HOST` | REST server host | `0.0.0.0` |
//! | `PRICE_SERVICE_REST_PORT` | REST server port | `8080` |
//! | `PRICE_SERVICE_LOG_LEVEL` | Log level | `info` |
//! | `PRICE_SERVICE_LOG_FORMAT` | Log format (json/pretty) | `json` |
//! | `PRICE_SERVICE_BY_PASS_SOCKET` | MegaMarket helper `host:port` | `127.0.0.1:8000` |
//! | `PRICE_SERVICE_WEBDRIVER_URL` | WebDriver endpoint | `http://127.0.0.1:4444` |
//! | `PRICE_SERVICE_NATS_URL` | NATS server URL | `nats://127.0.0.1:4222` |
//! | `PRICE_SERVICE_PRODUCTS_TOPIC` | Topic for async results | `products` |
//!
//! # Examples
//!
//! ```ignore
//! use price_service::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("REST server: {}:{}", config.rest.host, config.rest.port);
//! ```

use crate::application::services::{DispatchConfig, RetryPolicy};
use crate::infrastructure::markets::wildberries::{ScrollPlan, WildberriesUrls};
use crate::infrastructure::markets::{MegaMarketSettings, WildberriesSettings};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Prefix of every environment variable read by [`AppConfig::load`].
pub const ENV_PREFIX: &str = "PRICE_SERVICE_";

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Failed to read the `.env` file.
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
}

// ============================================================================
// Server Configuration
// ============================================================================

/// REST/HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    /// Server host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_rest_port")]
    pub port: u16,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_rest_port(),
        }
    }
}

impl RestConfig {
    /// Returns the socket address for the REST server.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field: "rest.host:port".to_string(),
                message: format!("{e}"),
            })
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

// ============================================================================
// Market Configuration
// ============================================================================

/// Wildberries adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildberriesConfig {
    /// Register the adapter.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Search API endpoint.
    #[serde(default = "default_wb_search_api")]
    pub search_api: String,

    /// Catalog page used for links and thumbnails.
    #[serde(default = "default_wb_catalog")]
    pub catalog: String,

    /// Prefix of product pages.
    #[serde(default = "default_wb_product_base")]
    pub product_base: String,

    /// HTTP timeout in milliseconds.
    #[serde(default = "default_wb_timeout")]
    pub timeout_ms: u64,

    /// Batch size that ends pagination.
    #[serde(default = "default_min_batch")]
    pub min_batch: usize,

    /// Maximum search calls per retrieval.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Time allowed for the product grid to render, in milliseconds.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Extra pause added to every scroll step, in milliseconds.
    #[serde(default)]
    pub load_coeff_ms: u64,
}

impl Default for WildberriesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_api: default_wb_search_api(),
            catalog: default_wb_catalog(),
            product_base: default_wb_product_base(),
            timeout_ms: default_wb_timeout(),
            min_batch: default_min_batch(),
            max_attempts: default_max_attempts(),
            wait_timeout_ms: default_wait_timeout(),
            load_coeff_ms: 0,
        }
    }
}

impl WildberriesConfig {
    /// Adapter settings for this configuration.
    #[must_use]
    pub fn settings(&self) -> WildberriesSettings {
        WildberriesSettings {
            urls: WildberriesUrls::new(&self.search_api, &self.catalog, &self.product_base),
            timeout_ms: self.timeout_ms,
            min_batch: self.min_batch,
            max_attempts: self.max_attempts,
            wait_timeout_ms: self.wait_timeout_ms,
            scroll: ScrollPlan {
                load_coeff_ms: self.load_coeff_ms,
                ..ScrollPlan::default()
            },
        }
    }
}

/// MegaMarket adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MegaMarketConfig {
    /// Register the adapter.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Helper service `host:port`.
    #[serde(default = "default_helper_address")]
    pub helper_address: String,

    /// Storefront origin for catalog links.
    #[serde(default = "default_mm_origin")]
    pub origin: String,

    /// Helper call timeout in milliseconds.
    #[serde(default = "default_mm_timeout")]
    pub timeout_ms: u64,

    /// Items kept for the minimal amount.
    #[serde(default = "default_min_amount")]
    pub min_amount: usize,
}

impl Default for MegaMarketConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            helper_address: default_helper_address(),
            origin: default_mm_origin(),
            timeout_ms: default_mm_timeout(),
            min_amount: default_min_amount(),
        }
    }
}

impl MegaMarketConfig {
    /// Adapter settings for this configuration.
    #[must_use]
    pub fn settings(&self) -> MegaMarketSettings {
        MegaMarketSettings {
            helper_address: self.helper_address.clone(),
            origin: self.origin.clone(),
            timeout_ms: self.timeout_ms,
            min_amount: self.min_amount,
        }
    }
}

/// Per-market configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketsConfig {
    /// Wildberries.
    #[serde(default)]
    pub wildberries: WildberriesConfig,

    /// MegaMarket.
    #[serde(default)]
    pub megamarket: MegaMarketConfig,
}

// ============================================================================
// Browser Configuration
// ============================================================================

/// Headless browser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Attach a browser session to the Wildberries adapter.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// WebDriver endpoint.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Timeout of a single WebDriver command in milliseconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,

    /// How often the page is polled while waiting for an element, in
    /// milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webdriver_url: default_webdriver_url(),
            headless: true,
            command_timeout_ms: default_command_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

// ============================================================================
// Messaging Configuration
// ============================================================================

/// Message broker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Topic for async results.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Publish attempts after the first one.
    #[serde(default = "default_publish_retries")]
    pub retries: u32,

    /// Pause between publish attempts in milliseconds.
    #[serde(default = "default_publish_delay")]
    pub retry_delay_ms: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            topic: default_topic(),
            retries: default_publish_retries(),
            retry_delay_ms: default_publish_delay(),
        }
    }
}

impl MessagingConfig {
    /// Retry policy for publishing.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retries, self.retry_delay_ms)
    }
}

// ============================================================================
// Dispatch Configuration
// ============================================================================

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSection {
    /// Upper bound for one market's answer, in milliseconds.
    #[serde(default = "default_per_market_timeout")]
    pub per_market_timeout_ms: u64,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            per_market_timeout_ms: default_per_market_timeout(),
        }
    }
}

impl DispatchSection {
    /// Dispatcher settings for this configuration.
    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::default().with_per_market_timeout(self.per_market_timeout_ms)
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST server configuration.
    #[serde(default)]
    pub rest: RestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Market adapters.
    #[serde(default)]
    pub markets: MarketsConfig,

    /// Headless browser.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Message broker.
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Dispatcher.
    #[serde(default)]
    pub dispatch: DispatchSection,
}

impl AppConfig {
    /// Loads configuration from the config file, `.env` and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::DotEnv(e.to_string())),
        }

        let mut config = Self::default();

        let config_path = std::env::var(format!("{ENV_PREFIX}CONFIG_FILE"))
            .unwrap_or_else(|_| "config.toml".to_string());

        if Path::new(&config_path).exists() {
            config = Self::from_file(&config_path)?;
        }

        config.apply_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok());

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Applies overrides; `lookup` receives names without the prefix.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // REST configuration
        if let Some(host) = lookup("REST_HOST") {
            self.rest.host = host;
        }
        if let Some(port) = lookup("REST_PORT")
            && let Ok(p) = port.parse()
        {
            self.rest.port = p;
        }

        // Logging configuration
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = match format.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }

        // Collaborators
        if let Some(socket) = lookup("BY_PASS_SOCKET") {
            self.markets.megamarket.helper_address = socket;
        }
        if let Some(url) = lookup("WEBDRIVER_URL") {
            self.browser.webdriver_url = url;
        }
        if let Some(url) = lookup("NATS_URL") {
            self.messaging.nats_url = url;
        }
        if let Some(topic) = lookup("PRODUCTS_TOPIC") {
            self.messaging.topic = topic;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rest.socket_addr()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".to_string(),
                message: format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            });
        }

        if self.markets.megamarket.enabled && self.markets.megamarket.helper_address.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "markets.megamarket.helper_address".to_string(),
                message: "must be set when megamarket is enabled".to_string(),
            });
        }

        if self.messaging.topic.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "messaging.topic".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rest_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_wb_search_api() -> String {
    crate::infrastructure::markets::wildberries::urls::DEFAULT_SEARCH_API.to_string()
}

fn default_wb_catalog() -> String {
    crate::infrastructure::markets::wildberries::urls::DEFAULT_CATALOG.to_string()
}

fn default_wb_product_base() -> String {
    crate::infrastructure::markets::wildberries::urls::DEFAULT_PRODUCT_BASE.to_string()
}

fn default_wb_timeout() -> u64 {
    10_000
}

fn default_min_batch() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    10
}

fn default_wait_timeout() -> u64 {
    15_000
}

fn default_helper_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_mm_origin() -> String {
    crate::infrastructure::markets::megamarket::urls::DEFAULT_ORIGIN.to_string()
}

fn default_mm_timeout() -> u64 {
    60_000
}

fn default_min_amount() -> usize {
    15
}

fn default_webdriver_url() -> String {
    "http://127.0.0.1:4444".to_string()
}

fn default_command_timeout() -> u64 {
    30_000
}

fn default_poll_interval() -> u64 {
    250
}

fn default_nats_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_topic() -> String {
    crate::application::services::DEFAULT_TOPIC.to_string()
}

fn default_publish_retries() -> u32 {
    5
}

fn default_publish_delay() -> u64 {
    50
}

fn default_per_market_timeout() -> u64 {
    120_000
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.rest.port, 8080);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.messaging.topic, "products");
        assert!(config.markets.wildberries.enabled);
        assert!(config.browser.headless);
        assert_eq!(config.browser.poll_interval_ms, 250);
    }

    #[test]
    fn rest_config_socket_addr() {
        let addr = RestConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn rest_config_invalid_address() {
        let config = RestConfig {
            host: "invalid host with spaces".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn app_config_validate_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn app_config_validate_invalid_log_level() {
        let mut config = AppConfig::default();
        config.log.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "log.level"
        ));
    }

    #[test]
    fn app_config_validate_empty_topic() {
        let mut config = AppConfig::default();
        config.messaging.topic.clear();
        assert!(config.validate().is_err());
    }

    mod toml_file {
        use super::*;

        #[test]
        fn partial_file_keeps_defaults() {
            let config: AppConfig = r#"
                [rest]
                port = 9090

                [markets.megamarket]
                helper_address = "helper:8000"

                [markets.wildberries]
                enabled = false
                load_coeff_ms = 250

                [dispatch]
                per_market_timeout_ms = 5000
            "#
            .parse()
            .unwrap();

            assert_eq!(config.rest.port, 9090);
            assert_eq!(config.rest.host, "0.0.0.0");
            assert_eq!(config.markets.megamarket.helper_address, "helper:8000");
            assert_eq!(config.markets.megamarket.min_amount, 15);
            assert!(!config.markets.wildberries.enabled);
            assert_eq!(config.markets.wildberries.settings().scroll.load_coeff_ms, 250);
            assert_eq!(config.dispatch.dispatch_config().per_market_timeout_ms, 5000);
        }

        #[test]
        fn malformed_file() {
            let result: Result<AppConfig, _> = "[rest\nport = ".parse();
            assert!(matches!(result, Err(ConfigError::Parse(_))));
        }

        #[test]
        fn missing_file() {
            assert!(matches!(
                AppConfig::from_file("/nonexistent/price-service.toml"),
                Err(ConfigError::FileRead(_))
            ));
        }
    }

    mod overrides {
        use super::*;

        fn apply(vars: &[(&str, &str)]) -> AppConfig {
            let vars: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            let mut config = AppConfig::default();
            config.apply_overrides(|name| vars.get(name).cloned());
            config
        }

        #[test]
        fn all_overrides() {
            let config = apply(&[
                ("REST_HOST", "127.0.0.1"),
                ("REST_PORT", "3000"),
                ("LOG_LEVEL", "debug"),
                ("LOG_FORMAT", "Pretty"),
                ("BY_PASS_SOCKET", "bypass:9000"),
                ("WEBDRIVER_URL", "http://chrome:4444"),
                ("NATS_URL", "nats://broker:4222"),
                ("PRODUCTS_TOPIC", "prices"),
            ]);

            assert_eq!(config.rest.socket_addr().unwrap().port(), 3000);
            assert_eq!(config.log.level, "debug");
            assert_eq!(config.log.format, LogFormat::Pretty);
            assert_eq!(config.markets.megamarket.settings().helper_address, "bypass:9000");
            assert_eq!(config.browser.webdriver_url, "http://chrome:4444");
            assert_eq!(config.messaging.nats_url, "nats://broker:4222");
            assert_eq!(config.messaging.topic, "prices");
        }

        #[test]
        fn unparsable_port_is_ignored() {
            let config = apply(&[("REST_PORT", "eighty")]);
            assert_eq!(config.rest.port, 8080);
        }

        #[test]
        fn retry_policy_from_messaging() {
            let policy = AppConfig::default().messaging.retry_policy();
            assert_eq!(policy, RetryPolicy::fixed(5, 50));
        }
    }
}
