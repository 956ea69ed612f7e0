//! # Price Service
//!
//! Main entry point for the price aggregation service.

use anyhow::Context;
use price_service::api::rest::{AppState, create_router};
use price_service::application::services::{AsyncCompletionPublisher, MarketDispatcher};
use price_service::config::{AppConfig, LogConfig, LogFormat};
use price_service::infrastructure::browser::{BrowserPool, WebDriverPool};
use price_service::infrastructure::markets::{
    MarketRegistry, MegaMarketAdapter, WildberriesAdapter,
};
use price_service::infrastructure::messaging::NatsMessageSink;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn build_registry(
    config: &AppConfig,
    pool: Option<&WebDriverPool>,
) -> anyhow::Result<MarketRegistry> {
    let mut registry = MarketRegistry::new();

    let wildberries = &config.markets.wildberries;
    if wildberries.enabled {
        let adapter = match pool {
            Some(pool) => WildberriesAdapter::connect(wildberries.settings(), pool)
                .await
                .context("opening browser session for wildberries")?,
            None => WildberriesAdapter::new(wildberries.settings())?,
        };
        registry.register(Arc::new(adapter));
    }

    let megamarket = &config.markets.megamarket;
    if megamarket.enabled {
        let adapter = MegaMarketAdapter::new(megamarket.settings())?;
        info!(endpoint = adapter.endpoint(), "megamarket helper configured");
        registry.register(Arc::new(adapter));
    }

    if registry.is_empty() {
        warn!("no market adapters enabled");
    } else {
        info!(markets = registry.len(), "market registry ready");
    }
    Ok(registry)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.log);
    config.validate()?;

    info!("Starting Price Service v{}", env!("CARGO_PKG_VERSION"));

    let sink = NatsMessageSink::connect(&config.messaging.nats_url)
        .await
        .context("connecting to the message broker")?;

    let pool = if config.browser.enabled && config.markets.wildberries.enabled {
        let pool = WebDriverPool::new(
            config.browser.webdriver_url.clone(),
            config.browser.command_timeout_ms,
        )?
        .with_headless(config.browser.headless)
        .with_poll_interval(Duration::from_millis(config.browser.poll_interval_ms));
        Some(pool)
    } else {
        None
    };

    let registry = match build_registry(&config, pool.as_ref()).await {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            if let Some(pool) = &pool {
                pool.release_all().await;
            }
            return Err(e);
        }
    };

    let dispatcher = MarketDispatcher::new(registry, config.dispatch.dispatch_config());
    let publisher = AsyncCompletionPublisher::new(dispatcher.clone(), Arc::new(sink))
        .with_topic(config.messaging.topic.clone())
        .with_retry(config.messaging.retry_policy());

    let state = Arc::new(AppState {
        dispatcher,
        publisher,
    });
    let app = create_router(state);

    let addr = config.rest.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "REST server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            info!("Shutting down Price Service");
        })
        .await;

    if let Some(pool) = &pool {
        pool.release_all().await;
    }

    served.context("serving REST requests")
}
