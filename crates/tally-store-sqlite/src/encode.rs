//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Periods are split into integer `year` and `month`
//! columns so SQLite orders them chronologically.

use chrono::{DateTime, Utc};
use tally_core::{fact::Fact, period::Period, product::Product};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Period ───────────────────────────────────────────────────────────────────

pub fn decode_period(year: i32, month: u32) -> Result<Period> {
  Ok(Period::new(year, month)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `facts` row joined with `products`.
pub struct RawFact {
  pub year:       i32,
  pub month:      u32,
  pub product_id: String,
  pub product:    String,
  pub sold:       i64,
  pub stock:      Option<i64>,
  pub updated_at: String,
}

impl RawFact {
  /// Column order expected by [`RawFact::from_row`].
  pub const COLUMNS: &'static str =
    "f.year, f.month, f.product_id, p.name, f.sold, f.stock, f.updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      year:       row.get(0)?,
      month:      row.get(1)?,
      product_id: row.get(2)?,
      product:    row.get(3)?,
      sold:       row.get(4)?,
      stock:      row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_fact(self) -> Result<Fact> {
    Ok(Fact {
      product_id: decode_uuid(&self.product_id)?,
      product:    self.product,
      period:     decode_period(self.year, self.month)?,
      sold:       self.sold,
      stock:      self.stock,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `products` row.
pub struct RawProduct {
  pub product_id: String,
  pub name:       String,
  pub created_at: String,
}

impl RawProduct {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id: row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      product_id: decode_uuid(&self.product_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
