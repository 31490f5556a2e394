// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::log_service::LogAnalyticsService;
use crate::application::query_service::QueryService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::csv_repository::CsvFileRepository;
use crate::infrastructure::http_query_backend::HttpQueryBackend;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create adapters (infrastructure layer)
    let repository = Arc::new(CsvFileRepository::new(config.logs.path.clone()));
    let backend = Arc::new(HttpQueryBackend::new(
        config.analytics.base_url.clone(),
        config.analytics.api_key.clone(),
        Duration::from_secs(config.analytics.timeout_secs),
    )?);

    // Create services (application layer)
    let state = Arc::new(AppState {
        log_service: LogAnalyticsService::new(repository),
        query_service: QueryService::new(backend),
    });

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!(
        "Starting log-dashboard on {} (logs: {}, analytics: {})",
        addr,
        config.logs.path,
        config.analytics.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
