//! HTML front end for the Tally ledger.
//!
//! Serves the monthly entry form, the yearly report and its spreadsheet
//! export, and mounts the JSON API from [`tally_api`] under `/api`.

pub mod error;
pub mod export;
pub mod pages;
pub mod templates;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tally_core::{settings::LedgerSettings, store::LedgerStore};
use tower_http::trace::TraceLayer;

use templates::Templates;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Product catalogue seeded at startup, in display order.
  pub products:   Vec<String>,
  pub ledger:     LedgerSettings,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".into(),
      port:       5000,
      store_path: PathBuf::from("sales.db"),
      products:   [
        "Bikes",
        "Scooters",
        "Harleys",
        "ATV's",
        "PWC's",
        "Boats",
        "Snowmobiles",
      ]
      .into_iter()
      .map(String::from)
      .collect(),
      ledger:     LedgerSettings::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all page handlers.
pub struct AppState<S: LedgerStore> {
  pub store:     Arc<S>,
  pub settings:  Arc<LedgerSettings>,
  pub templates: Arc<Templates>,
}

impl<S: LedgerStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      settings:  self.settings.clone(),
      templates: self.templates.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: HTML pages plus the API under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let api = tally_api::api_router(state.store.clone(), state.settings.clone());

  Router::new()
    .route("/",               get(pages::home::<S>))
    .route("/enter/{period}", get(pages::entry_form::<S>).post(pages::submit_entry::<S>))
    .route("/report",         get(pages::report::<S>))
    .route("/export.xlsx",    get(pages::export::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .ensure_products(vec!["Bikes".into(), "Scooters".into()])
      .await
      .unwrap();
    router(AppState {
      store:     Arc::new(store),
      settings:  Arc::new(LedgerSettings::default()),
      templates: Arc::new(Templates::new().unwrap()),
    })
  }

  async fn get_page(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
      .clone()
      .oneshot(Request::get(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
  }

  async fn post_form(app: &Router, uri: &str, form: &str) -> StatusCode {
    app
      .clone()
      .oneshot(
        Request::post(uri)
          .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
          .body(Body::from(form.to_owned()))
          .unwrap(),
      )
      .await
      .unwrap()
      .status()
  }

  #[tokio::test]
  async fn home_lists_months() {
    let app = app().await;
    let (status, html) = get_page(&app, "/?year=2025").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/enter/2025-01"));
    assert!(html.contains("/enter/2025-12"));
    assert!(!html.contains("locked</span>"));
  }

  #[tokio::test]
  async fn stock_column_only_in_january() {
    let app = app().await;
    let (status, jan) = get_page(&app, "/enter/2025-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(jan.contains("name=\"stock_Bikes\""));

    let (_, feb) = get_page(&app, "/enter/2025-02").await;
    assert!(!feb.contains("name=\"stock_Bikes\""));
    assert!(feb.contains("name=\"sales_Bikes\""));
  }

  #[tokio::test]
  async fn submit_redirects_and_persists() {
    let app = app().await;
    let status = post_form(
      &app,
      "/enter/2025-01",
      "sales_Bikes=10&stock_Bikes=100&sales_Scooters=",
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, html) = get_page(&app, "/enter/2025-01").await;
    assert!(html.contains("value=\"10\""));
    assert!(html.contains("value=\"100\""));

    let (_, home) = get_page(&app, "/").await;
    assert!(home.contains("Latest entered period: 2025-01"));
  }

  #[tokio::test]
  async fn locked_period_is_conflict() {
    let app = app().await;
    post_form(&app, "/enter/2025-01", "sales_Bikes=1").await;
    post_form(&app, "/enter/2025-02", "sales_Bikes=2").await;

    let status = post_form(&app, "/enter/2025-01", "sales_Bikes=50").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, html) = get_page(&app, "/enter/2025-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("readonly"));
    assert!(html.contains("value=\"1\""));
  }

  #[tokio::test]
  async fn invalid_quantity_is_bad_request() {
    let app = app().await;
    let status = post_form(&app, "/enter/2025-01", "sales_Bikes=ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, home) = get_page(&app, "/?year=2025").await;
    assert!(!home.contains("Latest entered period"));
  }

  #[tokio::test]
  async fn out_of_range_year_is_bad_request() {
    let app = app().await;
    for uri in [
      "/?year=2147483647",
      "/?year=-2147483648",
      "/?year=0",
      "/report?year=2147483647",
      "/export.xlsx?year=10000",
    ] {
      let (status, _) = get_page(&app, uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    let (status, html) = get_page(&app, "/?year=9999").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/enter/9999-12"));
  }

  #[tokio::test]
  async fn oversized_quantity_is_bad_request() {
    let app = app().await;
    let status = post_form(&app, "/enter/2025-01", "sales_Bikes=9223372036854775807").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_page(&app, "/report?year=2025").await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn report_renders_totals() {
    let app = app().await;
    post_form(&app, "/enter/2025-01", "sales_Bikes=10&stock_Bikes=100").await;
    post_form(&app, "/enter/2025-02", "sales_Bikes=20").await;

    let (status, html) = get_page(&app, "/report?year=2025").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Sales Report 2025"));
    assert!(html.contains(">30<"));
    assert!(html.contains(">70<"));
  }

  #[tokio::test]
  async fn export_downloads_workbook() {
    let app = app().await;
    post_form(&app, "/enter/2025-01", "sales_Bikes=3").await;

    let resp = app
      .clone()
      .oneshot(Request::get("/export.xlsx?year=2025").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], export::CONTENT_TYPE);
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("sales-report-2025.xlsx"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
  }

  #[tokio::test]
  async fn api_is_mounted() {
    let app = app().await;
    let (status, body) = get_page(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Scooters"));
  }
}
