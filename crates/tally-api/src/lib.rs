//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::LedgerStore`].
//! Transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone(), settings.clone()))
//! ```

pub mod error;
pub mod facts;
pub mod periods;
pub mod products;
pub mod report;

use std::sync::Arc;

use axum::{Router, routing::get};
use tally_core::{settings::LedgerSettings, store::LedgerStore};

pub use error::ApiError;

/// State shared by every API handler.
pub struct ApiState<S: LedgerStore> {
  pub store:    Arc<S>,
  pub settings: Arc<LedgerSettings>,
}

// Not derived: the derive would require `S: Clone`.
impl<S: LedgerStore> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), settings: self.settings.clone() }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: Arc<LedgerSettings>) -> Router<()>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Products
    .route("/products", get(products::list::<S>).post(products::create::<S>))
    // Periods
    .route("/periods", get(periods::list::<S>))
    .route("/periods/{period}", get(periods::get_one::<S>).put(periods::submit::<S>))
    // Facts
    .route("/facts", get(facts::list::<S>))
    // Report
    .route("/report", get(report::handler::<S>))
    .with_state(ApiState { store, settings })
}

#[cfg(test)]
mod tests;
