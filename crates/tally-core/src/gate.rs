//! Which periods accept writes.
//!
//! The gate holds no state of its own. Its watermark is the latest period
//! with any recorded fact, derived from the store on every check. A period
//! strictly before the watermark is locked; the watermark period itself and
//! everything after it are open. With no data at all, every period is open.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{Error, Result, period::Period, store::LedgerStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PeriodGate {
  watermark: Option<Period>,
}

impl PeriodGate {
  /// Build the gate from the periods that already hold data.
  pub fn new(entered: &BTreeSet<Period>) -> Self {
    Self { watermark: entered.last().copied() }
  }

  /// Derive the gate from the current contents of `store`.
  pub async fn load<S: LedgerStore>(store: &S) -> Result<Self, S::Error> {
    let entered = store.distinct_periods_with_data().await?;
    Ok(Self::new(&entered))
  }

  /// The latest period with data, if any.
  pub fn watermark(&self) -> Option<Period> { self.watermark }

  /// The year a view should show when the caller names none: the
  /// watermark's year, or the current year on a cold start.
  pub fn default_year(&self) -> i32 {
    self
      .watermark
      .map_or_else(|| Period::current().year(), |p| p.year())
  }

  /// `true` iff `period` is strictly before the watermark.
  ///
  /// A skipped period before the watermark is locked too, even though it
  /// holds no data.
  pub fn is_locked(&self, period: Period) -> bool {
    matches!(self.watermark, Some(latest) if period < latest)
  }

  /// Fail with [`Error::PeriodLocked`] if `period` does not accept writes.
  pub fn check(&self, period: Period) -> Result<()> {
    match self.watermark {
      Some(watermark) if period < watermark => {
        Err(Error::PeriodLocked { period, watermark })
      }
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(month: u32) -> Period { Period::new(2025, month).unwrap() }

  fn gate(months: &[u32]) -> PeriodGate {
    PeriodGate::new(&months.iter().map(|m| p(*m)).collect())
  }

  #[test]
  fn cold_start_everything_open() {
    let g = gate(&[]);
    assert_eq!(g.watermark(), None);
    for m in 1..=12 {
      assert!(!g.is_locked(p(m)));
    }
  }

  #[test]
  fn jan_to_mar_entered() {
    let g = gate(&[1, 2, 3]);
    assert!(g.is_locked(p(1)));
    assert!(g.is_locked(p(2)));
    assert!(!g.is_locked(p(3)));
    assert!(!g.is_locked(p(4)));
  }

  #[test]
  fn skipped_period_before_watermark_is_locked() {
    let g = gate(&[1, 4]);
    assert!(g.is_locked(p(2)));
    assert!(g.is_locked(p(3)));
    assert!(!g.is_locked(p(4)));
    assert!(!g.is_locked(p(6)));
  }

  #[test]
  fn watermark_spans_years() {
    let g = PeriodGate::new(&[Period::new(2025, 1).unwrap()].into_iter().collect());
    assert!(g.is_locked(Period::new(2024, 12).unwrap()));
    assert!(!g.is_locked(Period::new(2025, 2).unwrap()));
  }

  #[test]
  fn locking_is_monotonic() {
    let mut entered: BTreeSet<Period> = [p(1), p(3)].into_iter().collect();
    assert!(PeriodGate::new(&entered).is_locked(p(2)));
    for m in 4..=12 {
      entered.insert(p(m));
      assert!(PeriodGate::new(&entered).is_locked(p(2)));
    }
  }

  #[test]
  fn default_year_follows_watermark() {
    assert_eq!(gate(&[1, 2]).default_year(), 2025);
    assert_eq!(gate(&[]).default_year(), Period::current().year());
  }

  #[test]
  fn check_reports_watermark() {
    let g = gate(&[1, 2, 3]);
    assert_eq!(
      g.check(p(1)),
      Err(Error::PeriodLocked { period: p(1), watermark: p(3) })
    );
    assert_eq!(g.check(p(3)), Ok(()));
    assert_eq!(g.check(p(5)), Ok(()));
  }
}
