//! Redash Exporter - Prometheus exporter for Redash status metrics.
//!
//! Polls a Redash instance's internal status API and republishes it as
//! gauge series for scraping.

mod config;
mod metrics;
mod poller;
mod redash;
mod web;

use config::ServerConfig;
use metrics::MetricRegistry;
use poller::Poller;
use redash::RedashClient;
use web::Server;

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("redash_exporter=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting Redash exporter on {}...", cfg.listen_address);
    tracing::info!(
        "Polling {} every {}s",
        cfg.redash_base_url(),
        cfg.poll_interval_secs
    );
    if cfg.api_key.is_empty() {
        tracing::warn!("REDASH_API_KEY is not set; the status API will likely reject polls");
    }

    // Metric registry shared by the poll loop and the scrape handlers
    let registry = Arc::new(MetricRegistry::new()?);

    // Start the poll loop
    let client = RedashClient::new(&cfg.redash_base_url(), &cfg.api_key)?;
    let poller = Poller::new(
        client,
        registry.clone(),
        Duration::from_secs(cfg.poll_interval_secs),
    );
    tokio::spawn(poller.run());

    // Start web server
    let server = Server::new(cfg, registry);
    server.start().await?;

    Ok(())
}
