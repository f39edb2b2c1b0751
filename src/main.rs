use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lugat::{
  config, handlers, profiling,
  services::{JsonWordStore, MemoryResultStore},
  state::AppState,
};

/// How long to wait for queued results after the server stops
const RESULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lugat=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  // Initialize profiling (no-op if feature disabled)
  profiling::init();

  let settings = config::load_settings();
  let words = JsonWordStore::load_or_empty(&settings.collections_path);
  let ledger = Arc::new(MemoryResultStore::new());
  let (state, result_worker) = AppState::new(Arc::new(words), ledger, settings.exam_defaults.clone());

  let app = handlers::router(state);

  let bind_addr = settings.bind_addr();
  let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
    Ok(listener) => listener,
    Err(e) => {
      tracing::error!("Failed to bind to {}: {}", bind_addr, e);
      std::process::exit(1);
    }
  };

  tracing::info!("Server running on http://localhost:{}", settings.port);

  if let Err(e) = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
  {
    tracing::error!("Server error: {}", e);
  }

  // Unfinished sessions still hold result senders, so the worker may never
  // see the channel close.
  if tokio::time::timeout(RESULT_DRAIN_TIMEOUT, result_worker).await.is_err() {
    tracing::warn!("Gave up waiting for pending results");
  }

  profiling::shutdown();
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("Failed to listen for shutdown signal: {}", e);
  }
  tracing::info!("Shutting down");
}
