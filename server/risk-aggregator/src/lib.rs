//! Call Screen Risk Aggregator: deterministic, rule-based.
//!
//! Consumes phishing and deepfake analysis results per call, keeps running
//! aggregates, decides a call category, and maintains the call history and
//! the user's risk-number list.
//!
//! No DB, no network; pure computation + in-memory state.

pub mod call_store;
pub mod category;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod risk_numbers;
pub mod sections;
pub mod session;
pub mod types;

pub use call_store::CallStore;
pub use config::Config;
pub use engine::Engine;
pub use error::AggregatorError;
pub use risk_numbers::RiskNumberSet;
pub use session::CallSession;
pub use types::{CallCategory, CallRecord, Command, Output};
