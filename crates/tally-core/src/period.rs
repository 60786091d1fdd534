//! Calendar periods that facts are recorded against.
//!
//! A period is a `(year, month)` pair. The derived ordering compares the year
//! first and then the month, which is exactly chronological order; the
//! [`crate::gate::PeriodGate`] relies on it.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{Datelike, Month, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One calendar month of one year.
///
/// Serialised as `"YYYY-MM"`, which is also the form used in URLs.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
  year:  i32,
  month: u32,
}

impl Period {
  /// Years a period may fall in: those with a four-digit `YYYY` form.
  pub const YEARS: RangeInclusive<i32> = 1..=9999;

  /// Build a period; `month` is 1-based and must lie in `1..=12`.
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::InvalidPeriod(format!("{year}-{month:02}")));
    }
    Self::check_year(year)?;
    Ok(Self { year, month })
  }

  /// Fail with [`Error::InvalidPeriod`] unless `year` lies in
  /// [`Period::YEARS`].
  pub fn check_year(year: i32) -> Result<i32> {
    if Self::YEARS.contains(&year) {
      Ok(year)
    } else {
      Err(Error::InvalidPeriod(format!("year {year} is out of range")))
    }
  }

  /// The period containing today's date (UTC).
  pub fn current() -> Self {
    let today = Utc::now().date_naive();
    Self { year: today.year(), month: today.month() }
  }

  pub fn year(&self) -> i32 { self.year }

  /// 1-based month number.
  pub fn month(&self) -> u32 { self.month }

  /// English month name, e.g. `"January"`.
  pub fn month_name(&self) -> &'static str {
    Month::try_from(self.month as u8)
      .map(|m| m.name())
      .unwrap_or("Unknown")
  }

  /// All twelve periods of `year`, in order. `year` must already have
  /// passed [`Period::check_year`].
  pub fn months_of(year: i32) -> Vec<Self> {
    (1..=12).map(|month| Self { year, month }).collect()
  }

  /// Parse either the canonical `"YYYY-MM"` form or a bare month name
  /// (`"March"`, `"mar"`), which resolves against `default_year`.
  pub fn parse_in_year(s: &str, default_year: i32) -> Result<Self> {
    let s = s.trim();
    if let Ok(period) = s.parse() {
      return Ok(period);
    }
    let month = s
      .parse::<Month>()
      .map_err(|_| Error::InvalidPeriod(s.to_owned()))?;
    Self::new(default_year, month.number_from_month())
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidPeriod(s.to_owned());
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
      return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    Self::new(year, month)
  }
}

impl TryFrom<String> for Period {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Period> for String {
  fn from(p: Period) -> Self { p.to_string() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(year: i32, month: u32) -> Period { Period::new(year, month).unwrap() }

  #[test]
  fn ordering_is_chronological() {
    assert!(p(2024, 12) < p(2025, 1));
    assert!(p(2025, 2) < p(2025, 10));
    assert_eq!(p(2025, 3).max(p(2024, 11)), p(2025, 3));
  }

  #[test]
  fn parses_canonical_form() {
    assert_eq!("2025-03".parse::<Period>().unwrap(), p(2025, 3));
    assert_eq!("2025-3".parse::<Period>().unwrap(), p(2025, 3));
    assert!("2025-13".parse::<Period>().is_err());
    assert!("2025-00".parse::<Period>().is_err());
    assert!("25-01".parse::<Period>().is_err());
    assert!("March".parse::<Period>().is_err());
    assert!("0000-01".parse::<Period>().is_err());
  }

  #[test]
  fn years_are_bounded() {
    assert_eq!(Period::check_year(2025), Ok(2025));
    assert_eq!(Period::check_year(9999), Ok(9999));
    assert!(Period::check_year(0).is_err());
    assert!(Period::check_year(i32::MAX).is_err());
    assert!(Period::check_year(i32::MIN).is_err());
    assert!(Period::new(10_000, 1).is_err());
  }

  #[test]
  fn parses_month_names_against_default_year() {
    assert_eq!(Period::parse_in_year("January", 2024).unwrap(), p(2024, 1));
    assert_eq!(Period::parse_in_year("feb", 2024).unwrap(), p(2024, 2));
    assert_eq!(Period::parse_in_year("2023-07", 2024).unwrap(), p(2023, 7));
    assert!(matches!(
      Period::parse_in_year("Smarch", 2024),
      Err(Error::InvalidPeriod(_))
    ));
  }

  #[test]
  fn display_and_names() {
    assert_eq!(p(2025, 1).to_string(), "2025-01");
    assert_eq!(p(2025, 1).month_name(), "January");
    assert_eq!(p(2025, 12).month_name(), "December");
  }

  #[test]
  fn months_of_year() {
    let months = Period::months_of(2025);
    assert_eq!(months.len(), 12);
    assert_eq!(months[0], p(2025, 1));
    assert_eq!(months[11], p(2025, 12));
  }

  #[test]
  fn serde_uses_string_form() {
    let json = serde_json::to_string(&p(2025, 4)).unwrap();
    assert_eq!(json, "\"2025-04\"");
    let back: Period = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p(2025, 4));
    assert!(serde_json::from_str::<Period>("\"2025-99\"").is_err());
  }
}
