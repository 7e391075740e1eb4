//! In-memory call history: prepend on create, category updated in place by id.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AggregatorError;
use crate::normalize;
use crate::types::*;

const UNKNOWN_CALLER: &str = "알 수 없음";

#[derive(Debug, Clone, Default)]
pub struct CallStore {
  /// Newest-created first.
  calls: Vec<CallRecord>,
}

impl CallStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store seeded with the demo history the app ships with.
  pub fn with_samples() -> Self {
    let sample = |id: &str,
                  name: &str,
                  category: CallCategory,
                  call_type: CallType,
                  summary: &str,
                  (y, mo, d, h, mi): (i32, u32, u32, u32, u32)| {
      CallRecord {
        id: id.into(),
        name: name.into(),
        category,
        call_type,
        summary: summary.into(),
        date_time: at(y, mo, d, h, mi),
      }
    };

    Self {
      calls: vec![
        sample(
          "1",
          "070-5232-5486",
          CallCategory::PhishingSuspected,
          CallType::Incoming,
          "발신 전화 | 2분 5초",
          (2025, 6, 2, 15, 58),
        ),
        sample(
          "2",
          "02-6344-4478",
          CallCategory::Safe,
          CallType::Outgoing,
          "수신 전화 | 1분 12초",
          (2025, 6, 2, 14, 18),
        ),
        sample(
          "3",
          "조민혁 (모시공20)",
          CallCategory::NoContent,
          CallType::Missed,
          "부재중 전화",
          (2025, 5, 31, 19, 13),
        ),
        sample(
          "4",
          "010-1122-3344",
          CallCategory::DeepfakeSuspected,
          CallType::Outgoing,
          "발신 전화 | 3분 27초",
          (2025, 5, 30, 0, 0),
        ),
      ],
    }
  }

  /// Create a record from caller input and prepend it.
  pub fn add(&mut self, new: &NewCall) -> Result<CallRecord, AggregatorError> {
    let date_time = normalize::call_time(&new.date_time)?;

    let name = [new.name.trim(), new.number.trim()]
      .into_iter()
      .find(|s| !s.is_empty())
      .unwrap_or(UNKNOWN_CALLER)
      .to_string();

    let summary = match new.call_type {
      CallType::Incoming => format!("수신 전화 | {}", new.duration.trim()),
      CallType::Outgoing => format!("발신 전화 | {}", new.duration.trim()),
      CallType::Missed => "부재중 전화".to_string(),
    };

    let id = match new.id.as_deref().map(str::trim) {
      Some(id) if !id.is_empty() => {
        if self.get(id).is_some() {
          return Err(AggregatorError::validation("id", "already exists"));
        }
        id.to_string()
      }
      _ => self.derive_id(&name, &date_time),
    };

    let record = CallRecord {
      id,
      name,
      category: CallCategory::NoContent,
      call_type: new.call_type,
      summary,
      date_time,
    };
    self.calls.insert(0, record.clone());
    Ok(record)
  }

  /// Overwrite the category of one call. Last write wins.
  pub fn update_category(
    &mut self,
    id: &str,
    category: CallCategory,
  ) -> Result<&CallRecord, AggregatorError> {
    let call = self
      .calls
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or_else(|| AggregatorError::UnknownCall(id.to_string()))?;
    call.category = category;
    Ok(call)
  }

  pub fn get(&self, id: &str) -> Option<&CallRecord> {
    self.calls.iter().find(|c| c.id == id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &CallRecord> {
    self.calls.iter()
  }

  pub fn len(&self) -> usize {
    self.calls.len()
  }

  pub fn is_empty(&self) -> bool {
    self.calls.is_empty()
  }

  fn derive_id(&self, name: &str, date_time: &NaiveDateTime) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(name.as_bytes());
    hasher.update(b"|");
    hasher.update(date_time.format("%Y-%m-%dT%H:%M:%S").to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(self.calls.len().to_string().as_bytes());
    let hex = hasher.finalize().to_hex();
    format!("call-{}", &hex[..12])
  }
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
  NaiveDate::from_ymd_opt(y, mo, d)
    .and_then(|date| date.and_hms_opt(h, mi, 0))
    .unwrap_or_default()
}
