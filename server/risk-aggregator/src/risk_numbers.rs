//! The user's list of high-risk phone numbers (in memory only).

use serde::Serialize;

/// Insertion-ordered list of numbers. Duplicates are kept; removal drops every copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RiskNumberSet {
  numbers: Vec<String>,
}

impl RiskNumberSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append `raw.trim()`. Blank input is a no-op; inner whitespace is kept verbatim.
  ///
  /// Returns whether the set changed.
  pub fn add(&mut self, raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return false;
    }
    self.numbers.push(trimmed.to_string());
    true
  }

  /// Remove every exact match. Returns how many entries were dropped.
  pub fn remove(&mut self, number: &str) -> usize {
    let before = self.numbers.len();
    self.numbers.retain(|n| n != number);
    before - self.numbers.len()
  }

  pub fn contains(&self, number: &str) -> bool {
    self.numbers.iter().any(|n| n == number)
  }

  pub fn as_slice(&self) -> &[String] {
    &self.numbers
  }

  pub fn to_vec(&self) -> Vec<String> {
    self.numbers.clone()
  }

  pub fn len(&self) -> usize {
    self.numbers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.numbers.is_empty()
  }
}
