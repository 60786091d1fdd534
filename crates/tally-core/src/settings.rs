//! Ledger-wide settings: when stock counts are taken and how APUS is
//! averaged.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, fact::FactEntry, period::Period};

/// Which periods admit a stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockCadence {
  /// One count per year, taken in the given month (1-based).
  Annual { month: u32 },
  /// A count may be entered for every period.
  Monthly,
}

impl Default for StockCadence {
  fn default() -> Self { Self::Annual { month: 1 } }
}

impl StockCadence {
  /// Whether a stock quantity submitted for `period` is kept.
  pub fn admits(&self, period: Period) -> bool {
    match self {
      Self::Annual { month } => period.month() == *month,
      Self::Monthly => true,
    }
  }
}

/// Settings shared by the write path and the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
  pub stock_cadence: StockCadence,
  /// Divisor for APUS; a full year of monthly periods by default.
  pub apus_periods:  u32,
}

impl Default for LedgerSettings {
  fn default() -> Self {
    Self { stock_cadence: StockCadence::default(), apus_periods: 12 }
  }
}

impl LedgerSettings {
  /// Check values that deserialisation alone cannot constrain.
  pub fn validate(&self) -> Result<()> {
    if let StockCadence::Annual { month } = self.stock_cadence
      && !(1..=12).contains(&month)
    {
      return Err(Error::InvalidPeriod(format!("stock month {month}")));
    }
    Ok(())
  }

  /// Drop stock quantities the cadence does not admit for `period`.
  ///
  /// Stock outside the stock-taking period is discarded rather than
  /// rejected, so one form layout can be used for every period.
  pub fn apply_cadence(&self, period: Period, entries: &mut [FactEntry]) {
    if self.stock_cadence.admits(period) {
      return;
    }
    for entry in entries {
      if entry.stock.take().is_some() {
        tracing::debug!(%period, product = %entry.product, "dropping stock outside stock-taking period");
      }
    }
  }
}
