//! Service configuration from environment variables (`.env` is honored).

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
  pub bind_addr: IpAddr,
  pub port: u16,
  /// Deepfake classifier upload URL.
  pub deepfake_url: String,
  /// Phishing sentence classifier upload URL.
  pub phishing_url: String,
  /// Per-request timeout for analysis uploads. None waits indefinitely.
  pub analysis_timeout: Option<Duration>,
  pub seed_sample_calls: bool,
  /// How much of an unparseable upstream body is echoed back.
  pub error_preview_chars: usize,
  /// Request body cap for audio uploads.
  pub max_upload_bytes: usize,
  pub engine: risk_aggregator::Config,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      bind_addr: IpAddr::from([127, 0, 0, 1]),
      port: 5005,
      deepfake_url: "http://127.0.0.1:20000/predict".to_string(),
      phishing_url: "http://127.0.0.1:20001/analyze/".to_string(),
      analysis_timeout: None,
      seed_sample_calls: true,
      error_preview_chars: 200,
      max_upload_bytes: 50 * 1024 * 1024,
      engine: risk_aggregator::Config::default(),
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let defaults = Self::default();

    let analysis_timeout = match env::var("ANALYSIS_TIMEOUT_SECS") {
      Ok(v) if !v.trim().is_empty() => Some(Duration::from_secs(
        v.trim()
          .parse()
          .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
      )),
      _ => None,
    };

    Ok(Config {
      bind_addr: parsed("BIND_ADDR", defaults.bind_addr)?,
      port: parsed("PORT", defaults.port)?,
      deepfake_url: env::var("DEEPFAKE_URL").unwrap_or(defaults.deepfake_url),
      phishing_url: env::var("PHISHING_URL").unwrap_or(defaults.phishing_url),
      analysis_timeout,
      seed_sample_calls: parsed("SEED_SAMPLE_CALLS", defaults.seed_sample_calls)?,
      error_preview_chars: parsed("ERROR_PREVIEW_CHARS", defaults.error_preview_chars)?,
      max_upload_bytes: parsed("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
      engine: risk_aggregator::Config {
        phishing_threshold: parsed("PHISHING_THRESHOLD", defaults.engine.phishing_threshold)?,
        deepfake_threshold: parsed("DEEPFAKE_THRESHOLD", defaults.engine.deepfake_threshold)?,
      },
    })
  }
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(key) {
    Ok(v) if !v.trim().is_empty() => v
      .trim()
      .parse()
      .with_context(|| format!("{} has an invalid value: {:?}", key, v)),
    _ => Ok(default),
  }
}
