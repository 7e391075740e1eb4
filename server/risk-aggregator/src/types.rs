//! Core types for the risk aggregator (JSON contracts + internal models).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the analysis services send)
// ---------------------------------------------------------------------------

/// Response of the deepfake endpoint. Unknown fields are silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepfakeResponse {
  pub result: String,
  pub probability: Probability,
  #[serde(default)]
  pub filename: String,
}

/// The deepfake service reports `probability` as a decimal string; a bare
/// number is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probability {
  Number(f64),
  Text(String),
}

/// Response of the phishing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingResponse {
  pub results: Vec<PhishingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingItem {
  pub sentence: String,
  pub score: f64,
  pub is_phishing: bool,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// One transcribed utterance after validation: non-empty sentence, score in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
  pub sentence: String,
  pub score: f64,
  pub is_phishing: bool,
}

/// Whole-file synthetic voice verdict after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepfakeResult {
  pub probability: f64,
  pub label: String,
}

// ---------------------------------------------------------------------------
// Call category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallCategory {
  PhishingSuspected,
  DeepfakeSuspected,
  Safe,
  #[default]
  NoContent,
}

impl CallCategory {
  /// Label shown in the call history list.
  pub fn label(self) -> &'static str {
    match self {
      Self::PhishingSuspected => "보이스피싱 의심",
      Self::DeepfakeSuspected => "딥보이스 의심",
      Self::Safe => "안심 통화",
      Self::NoContent => "통화 내용 없음",
    }
  }
}

// ---------------------------------------------------------------------------
// Call records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
  Incoming,
  Outgoing,
  Missed,
}

/// One entry of the call history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
  pub id: String,
  pub name: String,
  pub category: CallCategory,
  pub call_type: CallType,
  pub summary: String,
  /// Local wall-clock time, serialized as `YYYY-MM-DDTHH:MM:SS`.
  pub date_time: NaiveDateTime,
}

/// Caller input for a new call record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCall {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub number: String,
  pub call_type: CallType,
  #[serde(default = "default_duration")]
  pub duration: String,
  /// RFC3339 (converted to local time) or naive `YYYY-MM-DDTHH:MM[:SS]`.
  pub date_time: String,
}

fn default_duration() -> String {
  "00:00:00".to_string()
}

// ---------------------------------------------------------------------------
// Session output
// ---------------------------------------------------------------------------

/// A transcript bubble derived from one analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
  pub id: String,
  pub text: String,
  pub is_phishing: bool,
  pub safe_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskBar {
  pub percent: u8,
  pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
  pub call_id: String,
  pub phishing_scores: Vec<f64>,
  pub voice_risk: RiskBar,
  pub deepfake: RiskBar,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deepfake_label: Option<String>,
  pub category: CallCategory,
  pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallDetail {
  pub call: CallRecord,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub session: Option<SessionSnapshot>,
}

// ---------------------------------------------------------------------------
// History sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SectionItem {
  #[serde(flatten)]
  pub call: CallRecord,
  pub time_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
  pub title: String,
  pub date: NaiveDate,
  pub items: Vec<SectionItem>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// One inbound command line from stdin.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
  AddCall {
    #[serde(flatten)]
    call: NewCall,
  },
  ListCalls,
  Deepfake {
    call_id: String,
    response: DeepfakeResponse,
  },
  Phishing {
    call_id: String,
    response: PhishingResponse,
  },
  /// Both results of one uploaded recording. Without `deepfake` the deepfake
  /// reading is reset to 0 (phishing-only analysis).
  Analyze {
    call_id: String,
    #[serde(default)]
    deepfake: Option<DeepfakeResponse>,
    phishing: PhishingResponse,
  },
  ResetDeepfake {
    call_id: String,
  },
  Decide {
    call_id: String,
  },
  Session {
    call_id: String,
  },
  AddRiskNumber {
    number: String,
  },
  RemoveRiskNumber {
    number: String,
  },
  ListRiskNumbers,
}

/// One outbound result line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
  Call { call: CallRecord },
  Sections { sections: Vec<Section> },
  Session { session: SessionSnapshot },
  Category { call_id: String, category: CallCategory },
  RiskNumbers { numbers: Vec<String> },
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
