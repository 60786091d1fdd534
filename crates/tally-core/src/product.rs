//! Products sold and counted in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A product known to the ledger. Facts reference it by `product_id`;
/// callers address it by its unique `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub product_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Normalise a product name for storage: surrounding whitespace is dropped
/// and the result must be non-empty.
pub fn normalize_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidProductName(name.to_owned()));
  }
  Ok(trimmed.to_owned())
}
