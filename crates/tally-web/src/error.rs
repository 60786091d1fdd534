//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use tally_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("conflict: {0}")]
  Conflict(String),
  #[error("template error: {0}")]
  Render(#[from] handlebars::RenderError),
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("export error: {0}")]
  Export(#[from] rust_xlsxwriter::XlsxError),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Classify a store failure. A form can only name the products it was
  /// rendered with, so an unknown product is the client's fault too.
  pub fn from_store<T: StoreError>(err: T) -> Self {
    use tally_core::Error as E;
    match err.domain() {
      Some(
        E::InvalidQuantity(_)
        | E::InvalidPeriod(_)
        | E::InvalidProductName(_)
        | E::UnknownProduct(_),
      ) => Error::BadRequest(err.to_string()),
      Some(E::PeriodLocked { .. } | E::DuplicateProduct(_)) => {
        Error::Conflict(err.to_string())
      }
      None => Error::Store(Box::new(err)),
    }
  }
}

impl From<tally_core::Error> for Error {
  fn from(err: tally_core::Error) -> Self { Error::from_store(err) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
      other => {
        tracing::error!(error = %other, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
      }
    }
  }
}
