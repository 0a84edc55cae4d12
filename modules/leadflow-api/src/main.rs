use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadflow_api::{router, AppState};
use leadflow_common::config::{DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_PROVIDER_URL};
use leadflow_enricher::ProviderEnricher;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadflow=info".parse()?))
        .init();

    let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("API_PORT").unwrap_or_else(|_| "3000".to_string());
    let base_url =
        std::env::var("APOLLO_BASE_URL").unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string());
    let call_timeout = Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS);

    let enricher = ProviderEnricher::with_timeout(&base_url, call_timeout)
        .context("Failed to build provider client")?;
    let state = Arc::new(AppState {
        enricher: Box::new(enricher),
        call_timeout,
    });

    let app = router(state);

    let addr = format!("{host}:{port}");
    info!("Leadflow enrichment function starting on {addr}");
    info!(provider = %base_url, "Forwarding to provider");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
