//! Category decision policy: phishing first, then deepfake, else safe.

use crate::config::Config;
use crate::types::CallCategory;

/// Decide the category of an analysed call.
///
/// Thresholds are strict: a percent equal to the threshold is not suspicious.
/// `NoContent` is never returned; it only marks calls that were never analysed.
pub fn decide(voice_risk_percent: u8, deepfake_percent: u8, config: &Config) -> CallCategory {
  if voice_risk_percent > config.phishing_threshold {
    CallCategory::PhishingSuspected
  } else if deepfake_percent > config.deepfake_threshold {
    CallCategory::DeepfakeSuspected
  } else {
    CallCategory::Safe
  }
}
