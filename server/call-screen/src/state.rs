//! Shared application state: the one engine plus the upload client.

use risk_aggregator::{CallStore, Engine};
use tokio::sync::Mutex;

use crate::client::AnalysisClient;
use crate::config::Config;

pub struct AppState {
  /// Never held across an upstream request.
  pub engine: Mutex<Engine>,
  pub client: AnalysisClient,
}

impl AppState {
  pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
    let calls = if config.seed_sample_calls {
      CallStore::with_samples()
    } else {
      CallStore::new()
    };
    Ok(Self {
      engine: Mutex::new(Engine::new(config.engine.clone(), calls)),
      client: AnalysisClient::new(config)?,
    })
  }
}
