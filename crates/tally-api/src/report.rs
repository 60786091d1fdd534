//! `GET /report[?year=<year>]`: the yearly report as JSON.
//!
//! Without `year`, reports on the watermark's year.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use tally_core::{aggregate::Report, gate::PeriodGate, period::Period, store::LedgerStore};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub year: Option<i32>,
}

pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ReportParams>,
) -> Result<Json<Report>, ApiError>
where
  S: LedgerStore,
{
  let year = match params.year {
    Some(year) => Period::check_year(year)?,
    None => PeriodGate::load(state.store.as_ref())
      .await
      .map_err(ApiError::from_store)?
      .default_year(),
  };

  let report = Report::load(state.store.as_ref(), year, &state.settings)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(report))
}
