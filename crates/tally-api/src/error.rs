//! Errors returned by the JSON handlers, rendered as `{"error": message}`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::store::StoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store failure: rejected submissions become 4xx, anything
  /// else is a 500.
  pub fn from_store<T: StoreError>(err: T) -> Self {
    use tally_core::Error as E;
    match err.domain() {
      Some(E::InvalidQuantity(_) | E::InvalidPeriod(_) | E::InvalidProductName(_)) => {
        ApiError::BadRequest(err.to_string())
      }
      Some(E::UnknownProduct(_)) => ApiError::NotFound(err.to_string()),
      Some(E::PeriodLocked { .. } | E::DuplicateProduct(_)) => {
        ApiError::Conflict(err.to_string())
      }
      None => ApiError::Store(Box::new(err)),
    }
  }
}

/// A body that does not deserialise (e.g. `"sold": "ten"` or `1.5`) is the
/// client's fault, reported in the same `{"error": ...}` shape.
impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<tally_core::Error> for ApiError {
  fn from(err: tally_core::Error) -> Self { ApiError::from_store(err) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
