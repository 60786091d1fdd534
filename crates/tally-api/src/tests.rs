//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tally_core::{settings::LedgerSettings, store::LedgerStore};
use tally_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::api_router;

async fn make_router() -> axum::Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .ensure_products(vec!["Bikes".into(), "Scooters".into()])
    .await
    .unwrap();
  api_router(Arc::new(store), Arc::new(LedgerSettings::default()))
}

async fn send(
  router: &axum::Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = router
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn entries(pairs: &[(&str, i64)]) -> Value {
  json!({
    "entries": pairs
      .iter()
      .map(|(product, sold)| json!({ "product": product, "sold": sold }))
      .collect::<Vec<_>>()
  })
}

// ── Products ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_products() {
  let router = make_router().await;

  let (status, body) =
    send(&router, "POST", "/products", Some(json!({ "name": "Boats" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["name"], "Boats");

  let (status, body) = send(&router, "GET", "/products", None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["Bikes", "Scooters", "Boats"]);
}

#[tokio::test]
async fn duplicate_product_is_conflict() {
  let router = make_router().await;
  let (status, body) =
    send(&router, "POST", "/products", Some(json!({ "name": "Bikes" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("Bikes"));
}

// ── Periods ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_period_is_dense_and_open() {
  let router = make_router().await;
  let (status, body) = send(&router, "GET", "/periods/2025-02", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["locked"], false);
  assert_eq!(body["stock_period"], false);
  let facts = body["facts"].as_array().unwrap();
  assert_eq!(facts.len(), 2);
  assert_eq!(facts[0]["sold"], 0);
  assert_eq!(facts[0]["stock"], Value::Null);
  assert_eq!(facts[0]["recorded"], false);
}

#[tokio::test]
async fn submit_then_read_back() {
  let router = make_router().await;
  let (status, body) = send(
    &router,
    "PUT",
    "/periods/2025-01",
    Some(json!({ "entries": [{ "product": "Bikes", "sold": 10, "stock": 100 }] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["stock"], 100);

  let (_, body) = send(&router, "GET", "/periods/2025-01", None).await;
  assert_eq!(body["facts"][0]["sold"], 10);
  assert_eq!(body["facts"][0]["recorded"], true);
  assert_eq!(body["facts"][1]["recorded"], false);

  let (_, body) = send(&router, "GET", "/periods", None).await;
  assert_eq!(body["entered"], json!(["2025-01"]));
  assert_eq!(body["watermark"], "2025-01");
}

#[tokio::test]
async fn stock_outside_cadence_month_is_dropped() {
  let router = make_router().await;
  let (status, body) = send(
    &router,
    "PUT",
    "/periods/2025-03",
    Some(json!({ "entries": [{ "product": "Bikes", "sold": 1, "stock": 50 }] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["stock"], Value::Null);
}

#[tokio::test]
async fn locked_period_is_conflict() {
  let router = make_router().await;
  for period in ["2025-01", "2025-02", "2025-03"] {
    let (status, _) = send(
      &router,
      "PUT",
      &format!("/periods/{period}"),
      Some(entries(&[("Bikes", 1)])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, _) = send(
    &router,
    "PUT",
    "/periods/2025-01",
    Some(entries(&[("Bikes", 5)])),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, jan) = send(&router, "GET", "/periods/January", None).await;
  assert_eq!(jan["period"], "2025-01");
  assert_eq!(jan["locked"], true);
  assert_eq!(jan["facts"][0]["sold"], 1);

  let (_, apr) = send(&router, "GET", "/periods/2025-04", None).await;
  assert_eq!(apr["locked"], false);
}

#[tokio::test]
async fn rejected_submissions_write_nothing() {
  let router = make_router().await;

  let (status, _) = send(
    &router,
    "PUT",
    "/periods/2025-01",
    Some(entries(&[("Bikes", 5), ("Hovercraft", 1)])),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    &router,
    "PUT",
    "/periods/2025-01",
    Some(entries(&[("Bikes", 5), ("Scooters", -2)])),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, facts) = send(&router, "GET", "/facts", None).await;
  assert_eq!(facts, json!([]));
}

#[tokio::test]
async fn malformed_quantities_are_bad_request() {
  let router = make_router().await;
  for sold in [json!("ten"), json!(1.5), json!(-1), json!(i64::MAX)] {
    let (status, body) = send(
      &router,
      "PUT",
      "/periods/2025-01",
      Some(json!({ "entries": [{ "product": "Bikes", "sold": sold }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "sold = {sold}");
    assert!(body["error"].is_string());
  }

  let (status, body) =
    send(&router, "POST", "/products", Some(json!({ "title": "Boats" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (_, facts) = send(&router, "GET", "/facts", None).await;
  assert_eq!(facts, json!([]));
}

#[tokio::test]
async fn out_of_range_report_year_is_bad_request() {
  let router = make_router().await;
  let (status, body) = send(&router, "GET", "/report?year=2147483647", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_period_is_bad_request() {
  let router = make_router().await;
  let (status, body) = send(&router, "GET", "/periods/2025-13", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ── Facts & report ──────────────────────────────────────────────────────────

#[tokio::test]
async fn report_aggregates_year() {
  let router = make_router().await;
  for (period, n) in [("2025-01", 10), ("2025-02", 20), ("2025-03", 30)] {
    send(
      &router,
      "PUT",
      &format!("/periods/{period}"),
      Some(entries(&[("Bikes", n), ("Scooters", n / 10)])),
    )
    .await;
  }

  let (status, report) = send(&router, "GET", "/report", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["year"], 2025);
  assert_eq!(report["grand_total"], 66);
  assert_eq!(report["rows"][0]["product"], "Bikes");
  assert_eq!(report["rows"][0]["total"], 60);
  assert_eq!(report["rows"][0]["apus"], 5.0);
  assert_eq!(report["series"][0]["monthly"][1], 20);

  let (_, facts) = send(&router, "GET", "/facts?year=2024", None).await;
  assert_eq!(facts, json!([]));
  let (_, facts) = send(&router, "GET", "/facts?year=2025", None).await;
  assert_eq!(facts.as_array().unwrap().len(), 6);
}
