//! Service errors and their HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use risk_aggregator::AggregatorError;
use serde_json::json;
use thiserror::Error;

/// Which analysis service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
  Deepfake,
  Phishing,
}

impl std::fmt::Display for Upstream {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Upstream::Deepfake => write!(f, "deepfake"),
      Upstream::Phishing => write!(f, "phishing"),
    }
  }
}

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("{service} service returned status {status}")]
  UpstreamStatus { service: Upstream, status: u16 },

  #[error("{service} service sent an unreadable response: {preview}")]
  UpstreamBody { service: Upstream, preview: String },

  #[error("{service} service request failed: {source}")]
  Upstream {
    service: Upstream,
    #[source]
    source: reqwest::Error,
  },

  #[error("multipart: {0}")]
  Multipart(String),

  #[error("no audio file in upload (expected multipart field `file`)")]
  MissingFile,

  #[error(transparent)]
  Aggregator(#[from] AggregatorError),
}

impl ServiceError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::UpstreamStatus { .. } | Self::UpstreamBody { .. } => StatusCode::BAD_GATEWAY,
      Self::Upstream { source, .. } if source.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
      Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
      Self::Multipart(_) | Self::MissingFile => StatusCode::BAD_REQUEST,
      Self::Aggregator(AggregatorError::UnknownCall(_)) => StatusCode::NOT_FOUND,
      Self::Aggregator(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
  }
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("request failed: {}", self);
    } else {
      tracing::warn!("request rejected: {}", self);
    }

    let mut body = json!({ "error": self.to_string() });
    if let Self::Aggregator(e) = &self {
      if let Some(field) = e.field() {
        body["field"] = json!(field);
      }
    }
    (status, Json(body)).into_response()
  }
}

/// First `max` characters of a body, marked when cut.
pub fn preview(body: &str, max: usize) -> String {
  let mut chars = body.chars();
  let head: String = chars.by_ref().take(max).collect();
  if chars.next().is_some() {
    format!("{}…", head)
  } else {
    head
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preview_truncates_on_char_boundary() {
    assert_eq!(preview("<html>oops</html>", 6), "<html>…");
    assert_eq!(preview("짧은", 10), "짧은");
    assert_eq!(preview("서버 오류입니다", 2), "서버…");
  }

  #[test]
  fn status_mapping() {
    let e = ServiceError::UpstreamStatus {
      service: Upstream::Phishing,
      status: 500,
    };
    assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
    assert!(e.to_string().contains("500"));

    let e = ServiceError::from(AggregatorError::UnknownCall("x".into()));
    assert_eq!(e.status(), StatusCode::NOT_FOUND);

    let e = ServiceError::from(AggregatorError::parse("probability"));
    assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(ServiceError::MissingFile.status(), StatusCode::BAD_REQUEST);
  }
}
