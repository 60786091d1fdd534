//! Handlers for `/facts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/facts` | Full scan; optional `?year=` filter |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use tally_core::{fact::Fact, store::LedgerStore};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub year: Option<i32>,
}

/// `GET /facts[?year=<year>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Fact>>, ApiError>
where
  S: LedgerStore,
{
  let mut facts = state
    .store
    .all_facts()
    .await
    .map_err(ApiError::from_store)?;

  if let Some(year) = params.year {
    facts.retain(|f| f.period.year() == year);
  }

  Ok(Json(facts))
}
