//! Binary entrypoint for the call screen service.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use call_screen::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = Config::from_env()?;
  let state = Arc::new(AppState::from_config(&config)?);
  let app = call_screen::router(state, &config);

  let addr = SocketAddr::new(config.bind_addr, config.port);
  tracing::info!(
    deepfake_url = %config.deepfake_url,
    phishing_url = %config.phishing_url,
    "call-screen listening on http://{}",
    addr
  );

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
