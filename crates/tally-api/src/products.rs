//! Handlers for `/products` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/products` | Registration order |
//! | `POST` | `/products` | Body: `{"name":"Boats"}`; 409 if the name is taken |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{product::Product, store::LedgerStore};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /products`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Product>>, ApiError>
where
  S: LedgerStore,
{
  let products = state
    .store
    .list_products()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(products))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /products`: returns 201 and the stored [`Product`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
{
  let Json(body) = body?;
  let product = state
    .store
    .add_product(body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(product)))
}
