//! Request/response types for the service.

use risk_aggregator::CallCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
  /// Deepfake first, then phishing.
  #[default]
  Full,
  /// Phishing only; the deepfake reading is reset to 0.
  Phishing,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
  #[serde(default)]
  pub mode: AnalysisMode,
}

#[derive(Debug, Deserialize)]
pub struct RiskNumberPayload {
  pub number: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
  pub call_id: String,
  pub category: CallCategory,
  pub label: &'static str,
}
