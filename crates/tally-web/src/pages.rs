//! HTML page handlers: month index, entry form, report and export.

use std::collections::HashMap;

use axum::{
  Form,
  extract::{Path, Query, State},
  http::header,
  response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tally_core::{
  aggregate::Report,
  fact::{FactEntry, parse_quantity},
  gate::PeriodGate,
  period::Period,
  store::LedgerStore,
};

use crate::{AppState, error::Error, export, templates::{Templates, script_json}};

#[derive(Debug, Deserialize)]
pub struct YearParams {
  pub year: Option<i32>,
}

async fn load_gate<S: LedgerStore>(state: &AppState<S>) -> Result<PeriodGate, Error> {
  PeriodGate::load(state.store.as_ref())
    .await
    .map_err(Error::from_store)
}

// ─── Home ─────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MonthLink {
  period:  String,
  name:    &'static str,
  locked:  bool,
  current: bool,
}

#[derive(Serialize)]
struct HomeView {
  title:     &'static str,
  year:      i32,
  prev_year: i32,
  next_year: i32,
  watermark: Option<String>,
  months:    Vec<MonthLink>,
}

/// `GET /[?year=<year>]`: the months of a year with their lock status.
pub async fn home<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<YearParams>,
) -> Result<Html<String>, Error>
where
  S: LedgerStore,
{
  let gate = load_gate(&state).await?;
  let year = match params.year {
    Some(year) => Period::check_year(year)?,
    None => gate.default_year(),
  };
  // The period that takes the next submission: the watermark itself.
  let current = gate.watermark();

  let months = Period::months_of(year)
    .into_iter()
    .map(|p| MonthLink {
      period:  p.to_string(),
      name:    p.month_name(),
      locked:  gate.is_locked(p),
      current: current == Some(p),
    })
    .collect();

  let view = HomeView {
    title: "Sales Entry",
    year,
    prev_year: year - 1,
    next_year: year + 1,
    watermark: gate.watermark().map(|p| p.to_string()),
    months,
  };
  Ok(Html(state.templates.render(Templates::HOME, &view)?))
}

// ─── Entry form ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct EntryRow {
  product: String,
  sold:    String,
  stock:   String,
}

#[derive(Serialize)]
struct EntryView {
  title:        String,
  month_name:   &'static str,
  year:         i32,
  locked:       bool,
  watermark:    Option<String>,
  stock_period: bool,
  rows:         Vec<EntryRow>,
}

/// `GET /enter/{period}`: the entry form, read-only when the period is
/// locked.
pub async fn entry_form<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
) -> Result<Html<String>, Error>
where
  S: LedgerStore,
{
  let gate = load_gate(&state).await?;
  let period = Period::parse_in_year(&raw, gate.default_year())?;

  let products = state
    .store
    .list_products()
    .await
    .map_err(Error::from_store)?;
  let sheet = state
    .store
    .facts_for_period(period)
    .await
    .map_err(Error::from_store)?;

  // Unrecorded products show blank inputs rather than the zero default.
  let rows = products
    .into_iter()
    .map(|p| {
      let q = sheet.get(&p.name);
      let recorded = sheet.contains(&p.name);
      EntryRow {
        sold:    if recorded { q.sold.to_string() } else { String::new() },
        stock:   q.stock.map(|s| s.to_string()).unwrap_or_default(),
        product: p.name,
      }
    })
    .collect();

  let view = EntryView {
    title: format!("Sales for {} {}", period.month_name(), period.year()),
    month_name: period.month_name(),
    year: period.year(),
    locked: gate.is_locked(period),
    watermark: gate.watermark().map(|p| p.to_string()),
    stock_period: state.settings.stock_cadence.admits(period),
    rows,
  };
  Ok(Html(state.templates.render(Templates::ENTRY, &view)?))
}

/// Read one `<prefix>_<product>` field of the entry form.
fn form_quantity(
  form: &HashMap<String, String>,
  prefix: &str,
  product: &str,
) -> Result<Option<i64>, Error> {
  let raw = form
    .get(&format!("{prefix}_{product}"))
    .map(String::as_str)
    .unwrap_or("");
  parse_quantity(raw).map_err(|e| Error::BadRequest(format!("{product} {prefix}: {e}")))
}

/// `POST /enter/{period}`: save the whole form, then return to the index.
///
/// Every product of the catalogue is written, so a blank sales field
/// records zero. Nothing is written if any field is invalid or the period
/// is locked.
pub async fn submit_entry<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
  Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, Error>
where
  S: LedgerStore,
{
  let gate = load_gate(&state).await?;
  let period = Period::parse_in_year(&raw, gate.default_year())?;

  let products = state
    .store
    .list_products()
    .await
    .map_err(Error::from_store)?;

  let mut entries = Vec::with_capacity(products.len());
  for product in products {
    let sold = form_quantity(&form, "sales", &product.name)?;
    let stock = form_quantity(&form, "stock", &product.name)?;
    entries.push(FactEntry::new(product.name, sold, stock));
  }
  state.settings.apply_cadence(period, &mut entries);

  state
    .store
    .upsert_batch(period, entries)
    .await
    .map_err(Error::from_store)?;

  Ok(Redirect::to(&format!("/?year={}", period.year())))
}

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ReportLine {
  product:   String,
  total:     i64,
  apus:      String,
  percent:   String,
  stock:     String,
  remaining: i64,
  oversold:  bool,
}

#[derive(Serialize)]
struct ReportView {
  title:       String,
  year:        i32,
  grand_total: i64,
  rows:        Vec<ReportLine>,
  trend_json:  String,
  share_json:  String,
}

#[derive(Serialize)]
struct TrendChart<'a> {
  labels: Vec<&'static str>,
  series: &'a [tally_core::aggregate::ProductSeries],
}

#[derive(Serialize)]
struct ShareChart<'a> {
  labels: Vec<&'a str>,
  values: Vec<f64>,
}

async fn load_report<S: LedgerStore>(
  state: &AppState<S>,
  year: Option<i32>,
) -> Result<Report, Error> {
  let year = match year {
    Some(year) => Period::check_year(year)?,
    None => load_gate(state).await?.default_year(),
  };
  Report::load(state.store.as_ref(), year, &state.settings)
    .await
    .map_err(Error::from_store)
}

/// `GET /report[?year=<year>]`: totals table plus trend and share charts.
pub async fn report<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<YearParams>,
) -> Result<Html<String>, Error>
where
  S: LedgerStore,
{
  let report = load_report(&state, params.year).await?;

  let trend = TrendChart {
    labels: report.periods.iter().map(|p| p.month_name()).collect(),
    series: &report.series,
  };
  let share = ShareChart {
    labels: report.rows.iter().map(|r| r.product.as_str()).collect(),
    values: report.rows.iter().map(|r| r.percent).collect(),
  };

  let view = ReportView {
    title:       format!("Sales Report {}", report.year),
    year:        report.year,
    grand_total: report.grand_total,
    trend_json:  script_json(&trend)?,
    share_json:  script_json(&share)?,
    rows:        report
      .rows
      .iter()
      .map(|r| ReportLine {
        product:   r.product.clone(),
        total:     r.total,
        apus:      format!("{:.2}", r.apus),
        percent:   format!("{:.1}", r.percent),
        stock:     r.stock.map(|s| s.to_string()).unwrap_or_default(),
        remaining: r.remaining,
        oversold:  r.remaining < 0,
      })
      .collect(),
  };
  Ok(Html(state.templates.render(Templates::REPORT, &view)?))
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /export.xlsx[?year=<year>]`: the report as a spreadsheet download.
pub async fn export<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<YearParams>,
) -> Result<Response, Error>
where
  S: LedgerStore,
{
  let report = load_report(&state, params.year).await?;
  let bytes = export::workbook(&report)?;
  let disposition = format!("attachment; filename=\"{}\"", export::file_name(report.year));

  Ok(
    (
      [
        (header::CONTENT_TYPE, export::CONTENT_TYPE.to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
      ],
      bytes,
    )
      .into_response(),
  )
}
