//! Binary entrypoint: read JSON command lines from stdin, write JSON lines to stdout.
//!
//! Each input line is a Command. Each output line is either:
//! - An Output (tagged by `kind`)
//! - An ErrorOutput (when parsing or validation fails)
//!
//! Pass `--samples` to start from the demo call history. Logs go to stderr.

use risk_aggregator::types::ErrorOutput;
use risk_aggregator::Engine;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let samples = std::env::args().any(|a| a == "--samples");
  let mut engine = if samples {
    Engine::with_samples()
  } else {
    Engine::with_defaults()
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        tracing::error!("read error: {}", e);
        std::process::exit(1);
      }
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    match engine.process_line(trimmed) {
      Ok(output) => {
        let _ = serde_json::to_writer(&mut out, &output);
        let _ = writeln!(out);
      }
      Err(e) => {
        tracing::warn!("command rejected: {}", e);
        let mut err = ErrorOutput::new(e.to_string());
        if let Some(field) = e.field() {
          err = err.with_field(field);
        }
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
    let _ = out.flush();
  }

  let _ = out.flush();
}
