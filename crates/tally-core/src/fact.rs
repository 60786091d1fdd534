//! Facts: one recorded (period, product) data point each.
//!
//! At most one fact exists per (period, product). A resubmission overwrites
//! the previous values; facts are never deleted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, period::Period};

// ─── Fact ────────────────────────────────────────────────────────────────────

/// A stored fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
  pub product_id: Uuid,
  /// Product name, resolved from `product_id` when the fact is read.
  pub product:    String,
  pub period:     Period,
  pub sold:       i64,
  /// Only set when a stock count was entered for this period.
  pub stock:      Option<i64>,
  /// Server-assigned; moves forward on every overwrite.
  pub updated_at: DateTime<Utc>,
}

// ─── FactEntry ───────────────────────────────────────────────────────────────

/// Largest quantity accepted for `sold` or `stock`.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// One line of a submission, as accepted by
/// [`crate::store::LedgerStore::upsert_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEntry {
  pub product: String,
  /// Missing means zero.
  #[serde(default)]
  pub sold:    Option<i64>,
  #[serde(default)]
  pub stock:   Option<i64>,
}

impl FactEntry {
  pub fn new(product: impl Into<String>, sold: Option<i64>, stock: Option<i64>) -> Self {
    Self { product: product.into(), sold, stock }
  }

  /// Reject quantities outside `0..=MAX_QUANTITY`.
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [("sold", self.sold), ("stock", self.stock)] {
      match value {
        Some(v) if v < 0 => {
          return Err(Error::InvalidQuantity(format!(
            "{} {field} must not be negative (got {v})",
            self.product
          )));
        }
        Some(v) if v > MAX_QUANTITY => {
          return Err(Error::InvalidQuantity(format!(
            "{} {field} exceeds {MAX_QUANTITY} (got {v})",
            self.product
          )));
        }
        _ => {}
      }
    }
    Ok(())
  }

  /// The quantity sold with the zero default applied.
  pub fn sold_or_zero(&self) -> i64 { self.sold.unwrap_or(0) }
}

/// Coerce a raw form value into a quantity.
///
/// Blank input means "not entered" and yields `None`; anything that is not an
/// integer in `0..=MAX_QUANTITY` is rejected with [`Error::InvalidQuantity`].
pub fn parse_quantity(raw: &str) -> Result<Option<i64>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  let value: i64 = raw
    .parse()
    .map_err(|_| Error::InvalidQuantity(format!("{raw:?} is not a whole number")))?;
  if value < 0 {
    return Err(Error::InvalidQuantity(format!("{value} is negative")));
  }
  if value > MAX_QUANTITY {
    return Err(Error::InvalidQuantity(format!("{value} exceeds {MAX_QUANTITY}")));
  }
  Ok(Some(value))
}

// ─── PeriodSheet ─────────────────────────────────────────────────────────────

/// The recorded quantities for one product in one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantities {
  pub sold:  i64,
  pub stock: Option<i64>,
}

/// The sparse set of facts recorded for a single period, keyed by product
/// name. Products without a fact read as `(0, None)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSheet {
  pub period: Period,
  entries:    BTreeMap<String, Quantities>,
}

impl PeriodSheet {
  pub fn new(period: Period) -> Self {
    Self { period, entries: BTreeMap::new() }
  }

  pub fn insert(&mut self, product: impl Into<String>, quantities: Quantities) {
    self.entries.insert(product.into(), quantities);
  }

  /// Quantities for `product`, defaulting to `(0, None)`.
  pub fn get(&self, product: &str) -> Quantities {
    self.entries.get(product).copied().unwrap_or_default()
  }

  /// Whether a fact was actually recorded for `product`.
  pub fn contains(&self, product: &str) -> bool { self.entries.contains_key(product) }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantities)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }
}
