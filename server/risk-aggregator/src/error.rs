//! Structured error types for the risk aggregator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("out of range: {field}: {value} (expected 0..=1)")]
  OutOfRange { field: String, value: f64 },

  #[error("parse: {0}")]
  Parse(String),

  #[error("unknown call: {0}")]
  UnknownCall(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl AggregatorError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn out_of_range(field: &str, value: f64) -> Self {
    Self::OutOfRange {
      field: field.to_string(),
      value,
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }

  /// Field name for errors tied to one input field.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Validation { field, .. } | Self::OutOfRange { field, .. } => Some(field),
      _ => None,
    }
  }
}
