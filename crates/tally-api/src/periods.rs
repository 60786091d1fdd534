//! Handlers for `/periods` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/periods` | Periods holding data and the current watermark |
//! | `GET`  | `/periods/{period}` | Dense sheet over all products, plus lock status |
//! | `PUT`  | `/periods/{period}` | Body: [`SubmitBody`]; 400 if malformed, 409 if the period is locked |
//!
//! `{period}` is `YYYY-MM`, or a bare month name resolved against the
//! watermark's year.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tally_core::{
  fact::{Fact, FactEntry},
  gate::PeriodGate,
  period::Period,
  store::LedgerStore,
};

use crate::{ApiState, error::ApiError};

/// Parse a `:period` path segment.
pub(crate) fn resolve_period(raw: &str, gate: &PeriodGate) -> Result<Period, ApiError> {
  Ok(Period::parse_in_year(raw, gate.default_year())?)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodsView {
  pub entered:   Vec<Period>,
  pub watermark: Option<Period>,
}

/// `GET /periods`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<PeriodsView>, ApiError>
where
  S: LedgerStore,
{
  let entered = state
    .store
    .distinct_periods_with_data()
    .await
    .map_err(ApiError::from_store)?;
  let watermark = PeriodGate::new(&entered).watermark();
  Ok(Json(PeriodsView { entered: entered.into_iter().collect(), watermark }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// One product's line in a period view.
#[derive(Debug, Serialize, Deserialize)]
pub struct SheetLine {
  pub product:  String,
  pub sold:     i64,
  pub stock:    Option<i64>,
  /// Whether a fact is actually stored, as opposed to the zero default.
  pub recorded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodView {
  pub period:       Period,
  pub locked:       bool,
  pub watermark:    Option<Period>,
  /// Whether a stock count is accepted for this period.
  pub stock_period: bool,
  pub facts:        Vec<SheetLine>,
}

/// `GET /periods/{period}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<PeriodView>, ApiError>
where
  S: LedgerStore,
{
  let gate = PeriodGate::load(state.store.as_ref())
    .await
    .map_err(ApiError::from_store)?;
  let period = resolve_period(&raw, &gate)?;

  let products = state
    .store
    .list_products()
    .await
    .map_err(ApiError::from_store)?;
  let sheet = state
    .store
    .facts_for_period(period)
    .await
    .map_err(ApiError::from_store)?;

  let facts = products
    .into_iter()
    .map(|p| {
      let q = sheet.get(&p.name);
      SheetLine {
        recorded: sheet.contains(&p.name),
        product:  p.name,
        sold:     q.sold,
        stock:    q.stock,
      }
    })
    .collect();

  Ok(Json(PeriodView {
    period,
    locked: gate.is_locked(period),
    watermark: gate.watermark(),
    stock_period: state.settings.stock_cadence.admits(period),
    facts,
  }))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /periods/{period}`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub entries: Vec<FactEntry>,
}

/// `PUT /periods/{period}`: upserts every entry or none of them.
///
/// Stock quantities outside the stock-taking period are dropped before the
/// write.
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  Path(raw): Path<String>,
  body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<Vec<Fact>>, ApiError>
where
  S: LedgerStore,
{
  let Json(mut body) = body?;
  let gate = PeriodGate::load(state.store.as_ref())
    .await
    .map_err(ApiError::from_store)?;
  let period = resolve_period(&raw, &gate)?;

  state.settings.apply_cadence(period, &mut body.entries);
  let facts = state
    .store
    .upsert_batch(period, body.entries)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(facts))
}
