//! Binary entrypoint for the incident data service.

use std::sync::Arc;

use incident_data::{router, AppState, DataSource, InMemoryDataSource, ServiceConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_target(false)
    .compact()
    .init();

  let config = ServiceConfig::from_env()?;
  let source = InMemoryDataSource::seeded(config.latency)?;
  let addr = config.socket_addr();
  tracing::info!(
    backend = source.backend_tag(),
    latency_ms = config.latency.as_millis() as u64,
    "data source ready"
  );
  let state = Arc::new(AppState::new(Arc::new(source), config));

  let app = router(state);

  tracing::info!("incident-data listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  tracing::info!("incident-data shutdown complete");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!("failed to install Ctrl+C handler: {}", e);
    std::future::pending::<()>().await;
  }
  tracing::info!("received Ctrl+C, shutting down");
}
