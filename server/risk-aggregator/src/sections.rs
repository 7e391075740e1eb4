//! Group call history into day sections, newest first.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::types::{CallRecord, Section, SectionItem};

const WEEKDAYS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Section header, e.g. "6월 2일 월요일".
pub fn day_title(date: NaiveDate) -> String {
  let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
  format!("{}월 {}일 {}요일", date.month(), date.day(), weekday)
}

/// 12-hour clock label, e.g. "오후 3:58" or "오전 12:00".
pub fn time_label(ts: &NaiveDateTime) -> String {
  let h = ts.hour();
  let meridiem = if h >= 12 { "오후" } else { "오전" };
  let hour12 = (h + 11) % 12 + 1;
  format!("{} {}:{:02}", meridiem, hour12, ts.minute())
}

/// Group calls by local calendar day.
///
/// Sections and the items inside them are ordered newest first. Calls with
/// equal timestamps keep their store order.
pub fn group_by_day<'a>(calls: impl IntoIterator<Item = &'a CallRecord>) -> Vec<Section> {
  let mut sorted: Vec<&CallRecord> = calls.into_iter().collect();
  sorted.sort_by(|a, b| b.date_time.cmp(&a.date_time));

  let mut sections: Vec<Section> = Vec::new();
  for call in sorted {
    let date = call.date_time.date();
    let item = SectionItem {
      call: call.clone(),
      time_label: time_label(&call.date_time),
    };
    match sections.last_mut() {
      Some(section) if section.date == date => section.items.push(item),
      _ => sections.push(Section {
        title: day_title(date),
        date,
        items: vec![item],
      }),
    }
  }
  sections
}
