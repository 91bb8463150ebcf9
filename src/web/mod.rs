//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::metrics::MetricRegistry;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MetricRegistry>,
}

/// Web server exposing the metric registry to scrapers.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: ServerConfig, registry: Arc<MetricRegistry>) -> Self {
        Self {
            config,
            state: AppState { registry },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::handle_root))
            .route("/metrics", get(handlers::handle_metrics))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server on the configured address.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let router = self.routes();

        tracing::info!("Web server listening on {}", self.config.listen_address);

        let listener = tokio::net::TcpListener::bind(&self.config.listen_address).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
