//! Aggregator configuration with sane defaults.

/// Tunable thresholds for call categorization.
#[derive(Debug, Clone)]
pub struct Config {
  /// Voice risk percent that must be strictly exceeded to suspect phishing.
  pub phishing_threshold: u8,
  /// Deepfake percent that must be strictly exceeded to suspect a synthetic voice.
  pub deepfake_threshold: u8,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      phishing_threshold: 50,
      deepfake_threshold: 50,
    }
  }
}
