//! Error types for `tally-core`.

use thiserror::Error;

use crate::period::Period;

/// A rejected ledger operation.
///
/// Every variant is detected before any mutation; a submission that fails
/// with one of these leaves the store untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// A negative or non-numeric quantity.
  #[error("invalid quantity: {0}")]
  InvalidQuantity(String),

  #[error("unknown product: {0:?}")]
  UnknownProduct(String),

  #[error("period {period} is locked; data has already been entered for {watermark}")]
  PeriodLocked { period: Period, watermark: Period },

  #[error("invalid period: {0:?}")]
  InvalidPeriod(String),

  #[error("product already exists: {0:?}")]
  DuplicateProduct(String),

  #[error("invalid product name: {0:?}")]
  InvalidProductName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
