//! Percent-to-color mapping for the risk bars.

use crate::types::RiskBar;

const LOW: (f64, f64, f64) = (238.0, 238.0, 238.0);
const HIGH: (f64, f64, f64) = (255.0, 59.0, 48.0);

/// Blend from light grey (0%) to alert red (100%), as `rgb(r,g,b)`.
pub fn risk_color(percent: u8) -> String {
  let t = f64::from(percent.min(100)) / 100.0;
  let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
  format!(
    "rgb({},{},{})",
    mix(LOW.0, HIGH.0),
    mix(LOW.1, HIGH.1),
    mix(LOW.2, HIGH.2)
  )
}

pub fn risk_bar(percent: u8) -> RiskBar {
  let percent = percent.min(100);
  RiskBar {
    percent,
    color: risk_color(percent),
  }
}

/// Scale a unit-interval value to a rounded percent.
pub fn to_percent(unit: f64) -> u8 {
  (unit * 100.0).round().clamp(0.0, 100.0) as u8
}
