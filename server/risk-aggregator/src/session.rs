//! Per-call analysis session: running phishing aggregate + last deepfake score.

use crate::display;
use crate::types::*;

/// One ingested utterance score, scaled to [0,100].
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoreEntry {
  percent: f64,
  flagged: bool,
}

/// Aggregate state for one open analysis session.
#[derive(Debug, Clone)]
pub struct CallSession {
  call_id: String,
  /// Arrival order, never reordered or deduplicated.
  scores: Vec<ScoreEntry>,
  voice_risk_percent: u8,
  deepfake_percent: u8,
  deepfake_label: Option<String>,
  messages: Vec<ChatMessage>,
}

impl CallSession {
  pub fn new(call_id: impl Into<String>) -> Self {
    Self {
      call_id: call_id.into(),
      scores: Vec::new(),
      voice_risk_percent: 0,
      deepfake_percent: 0,
      deepfake_label: None,
      messages: Vec::new(),
    }
  }

  /// Append a validated batch and return the recomputed voice risk percent.
  ///
  /// Voice risk is the max, over the whole history, of the scores the service
  /// flagged as phishing. Unflagged scores are kept in the history but never
  /// raise it.
  pub fn ingest_phishing_batch(&mut self, results: &[AnalysisResult]) -> u8 {
    for result in results {
      self.scores.push(ScoreEntry {
        percent: result.score * 100.0,
        flagged: result.is_phishing,
      });
      let message = self.message_for(result);
      self.messages.push(message);
    }
    self.voice_risk_percent = self.recompute_voice_risk();
    self.voice_risk_percent
  }

  /// Overwrite the deepfake percent with `round(probability * 100)`.
  pub fn ingest_deepfake_score(&mut self, probability: f64) -> u8 {
    self.deepfake_percent = display::to_percent(probability);
    self.deepfake_percent
  }

  pub fn ingest_deepfake(&mut self, result: &DeepfakeResult) -> u8 {
    self.deepfake_label = Some(result.label.clone());
    self.ingest_deepfake_score(result.probability)
  }

  /// Phishing-only analyses start from a zero deepfake reading.
  pub fn reset_deepfake(&mut self) {
    self.deepfake_percent = 0;
    self.deepfake_label = None;
  }

  pub fn voice_risk_percent(&self) -> u8 {
    self.voice_risk_percent
  }

  pub fn deepfake_percent(&self) -> u8 {
    self.deepfake_percent
  }

  pub fn phishing_scores(&self) -> Vec<f64> {
    self.scores.iter().map(|s| s.percent).collect()
  }

  pub fn messages(&self) -> &[ChatMessage] {
    &self.messages
  }

  pub fn snapshot(&self, category: CallCategory) -> SessionSnapshot {
    SessionSnapshot {
      call_id: self.call_id.clone(),
      phishing_scores: self.phishing_scores(),
      voice_risk: display::risk_bar(self.voice_risk_percent),
      deepfake: display::risk_bar(self.deepfake_percent),
      deepfake_label: self.deepfake_label.clone(),
      category,
      messages: self.messages.clone(),
    }
  }

  fn recompute_voice_risk(&self) -> u8 {
    self
      .scores
      .iter()
      .filter(|s| s.flagged)
      .map(|s| s.percent)
      .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |m| m.max(p))))
      .map(|max| max.round().clamp(0.0, 100.0) as u8)
      .unwrap_or(0)
  }

  fn message_for(&self, result: &AnalysisResult) -> ChatMessage {
    // Stable id: call + position + sentence.
    let seq = self.messages.len();
    let mut hasher = blake3::Hasher::new();
    hasher.update(self.call_id.as_bytes());
    hasher.update(b"|");
    hasher.update(seq.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(result.sentence.as_bytes());
    let hex = hasher.finalize().to_hex();

    ChatMessage {
      id: format!("msg-{}", &hex[..16]),
      text: result.sentence.clone(),
      is_phishing: result.is_phishing,
      safe_percent: display::to_percent(1.0 - result.score),
    }
  }
}
