//! Validate analysis-service responses and caller input into internal models.
//!
//! Everything here runs before any state is touched, so a rejected payload
//! never leaves a half-applied batch behind.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};

use crate::error::AggregatorError;
use crate::types::*;

/// Validate a deepfake response: `probability` must parse to a finite number in [0,1].
///
/// `result` is carried through as the label only; it never influences scoring.
pub fn deepfake(raw: &DeepfakeResponse) -> Result<DeepfakeResult, AggregatorError> {
  let probability = match &raw.probability {
    Probability::Number(n) => *n,
    Probability::Text(s) => s.trim().parse::<f64>().map_err(|e| {
      AggregatorError::parse(format!("probability: {:?} is not a number: {}", s, e))
    })?,
  };
  let probability = unit_interval("probability", probability)?;

  Ok(DeepfakeResult {
    probability,
    label: raw.result.trim().to_string(),
  })
}

/// Validate every item of a phishing response. One bad item rejects the whole batch.
pub fn phishing(raw: &PhishingResponse) -> Result<Vec<AnalysisResult>, AggregatorError> {
  raw
    .results
    .iter()
    .enumerate()
    .map(|(i, item)| {
      if item.sentence.trim().is_empty() {
        return Err(AggregatorError::validation(
          &format!("results[{}].sentence", i),
          "must not be empty",
        ));
      }
      let score = unit_interval(&format!("results[{}].score", i), item.score)?;
      Ok(AnalysisResult {
        sentence: item.sentence.clone(),
        score,
        is_phishing: item.is_phishing,
      })
    })
    .collect()
}

/// Parse a call timestamp into local wall-clock time, truncated to whole seconds.
///
/// RFC3339 input (with offset or `Z`) is converted to the local zone; naive
/// input is taken as already local.
pub fn call_time(raw: &str) -> Result<NaiveDateTime, AggregatorError> {
  let raw = raw.trim();
  let parsed = match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => dt.with_timezone(&Local).naive_local(),
    Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
      .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
      .map_err(|e| {
        AggregatorError::validation("date_time", &format!("invalid ISO-8601 timestamp: {}", e))
      })?,
  };
  Ok(parsed.with_nanosecond(0).unwrap_or(parsed))
}

fn unit_interval(field: &str, value: f64) -> Result<f64, AggregatorError> {
  if value.is_finite() && (0.0..=1.0).contains(&value) {
    Ok(value)
  } else {
    Err(AggregatorError::out_of_range(field, value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn deepfake_raw(probability: Probability) -> DeepfakeResponse {
    DeepfakeResponse {
      result: "spoof".into(),
      probability,
      filename: "call.wav".into(),
    }
  }

  fn item(sentence: &str, score: f64) -> PhishingItem {
    PhishingItem {
      sentence: sentence.into(),
      score,
      is_phishing: false,
    }
  }

  #[test]
  fn deepfake_parses_string_probability() {
    let out = deepfake(&deepfake_raw(Probability::Text(" 0.87 ".into()))).unwrap();
    assert!((out.probability - 0.87).abs() < 1e-12);
    assert_eq!(out.label, "spoof");
  }

  #[test]
  fn deepfake_accepts_numeric_probability() {
    let out = deepfake(&deepfake_raw(Probability::Number(0.25))).unwrap();
    assert!((out.probability - 0.25).abs() < 1e-12);
  }

  #[test]
  fn deepfake_rejects_non_numeric_probability() {
    let err = deepfake(&deepfake_raw(Probability::Text("high".into()))).unwrap_err();
    assert!(matches!(err, AggregatorError::Parse(_)));
    assert!(err.to_string().contains("probability"));
  }

  #[test]
  fn deepfake_rejects_out_of_range_and_nan() {
    let err = deepfake(&deepfake_raw(Probability::Text("1.2".into()))).unwrap_err();
    assert!(matches!(err, AggregatorError::OutOfRange { .. }));
    let err = deepfake(&deepfake_raw(Probability::Text("NaN".into()))).unwrap_err();
    assert!(matches!(err, AggregatorError::OutOfRange { .. }));
  }

  #[test]
  fn phishing_rejects_whole_batch_on_one_bad_item() {
    let raw = PhishingResponse {
      results: vec![item("hello", 0.1), item("send money", 1.5)],
    };
    let err = phishing(&raw).unwrap_err();
    assert_eq!(err.field(), Some("results[1].score"));
  }

  #[test]
  fn phishing_rejects_blank_sentence() {
    let raw = PhishingResponse {
      results: vec![item("   ", 0.1)],
    };
    let err = phishing(&raw).unwrap_err();
    assert_eq!(err.field(), Some("results[0].sentence"));
  }

  #[test]
  fn phishing_keeps_order() {
    let raw = PhishingResponse {
      results: vec![item("first", 0.1), item("second", 0.9)],
    };
    let out = phishing(&raw).unwrap();
    assert_eq!(out[0].sentence, "first");
    assert_eq!(out[1].sentence, "second");
  }

  #[test]
  fn call_time_accepts_naive_forms() {
    let t = call_time("2025-06-02T15:58:00").unwrap();
    assert_eq!(t.to_string(), "2025-06-02 15:58:00");
    let t = call_time("2025-06-02T15:58").unwrap();
    assert_eq!(t.to_string(), "2025-06-02 15:58:00");
    let t = call_time("2025-06-02T15:58:00.750").unwrap();
    assert_eq!(t.to_string(), "2025-06-02 15:58:00");
  }

  #[test]
  fn call_time_rejects_garbage() {
    let err = call_time("yesterday").unwrap_err();
    assert_eq!(err.field(), Some("date_time"));
  }
}
