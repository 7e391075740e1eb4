//! Call Screen Service
//!
//! HTTP service around one in-memory risk aggregator engine. Uploads call audio
//! to the analysis services and serves call history and risk numbers.
//! Bind to 127.0.0.1 by default (internal only).

pub mod client;
pub mod config;
pub mod error;
mod handlers;
mod state;
pub mod types;

use axum::{
  extract::DefaultBodyLimit,
  routing::{delete, get, post},
  Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::ServiceError;
pub use handlers::health;
pub use state::AppState;

/// Build the service router around shared state.
pub fn router(state: Arc<AppState>, config: &Config) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/calls", get(handlers::list_calls).post(handlers::create_call))
    .route("/calls/:id", get(handlers::get_call))
    .route("/calls/:id/analyze", post(handlers::analyze))
    .route("/calls/:id/decide", post(handlers::decide))
    .route(
      "/risk-numbers",
      get(handlers::list_risk_numbers).post(handlers::add_risk_number),
    )
    .route("/risk-numbers/:number", delete(handlers::remove_risk_number))
    .layer(DefaultBodyLimit::max(config.max_upload_bytes))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
