//! The `LedgerStore` trait and its error bound.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, `tally-web`) depend on this abstraction, not on
//! any concrete backend.

use std::{collections::BTreeSet, future::Future};

use crate::{
  Error,
  fact::{Fact, FactEntry, PeriodSheet},
  period::Period,
  product::Product,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error bound for store backends.
///
/// Lets the HTTP layers tell a rejected submission (a domain [`Error`]) apart
/// from a storage fault without knowing the backend's error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error behind this failure, if there is one.
  fn domain(&self) -> Option<&Error>;
}

impl StoreError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Tally ledger backend.
///
/// Writes are upserts keyed by (period, product); there is never more than
/// one fact per key. Every write passes through the
/// [`crate::gate::PeriodGate`], evaluated against the data already stored,
/// and a rejected submission writes nothing.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LedgerStore: Send + Sync {
  type Error: StoreError;

  // ── Products ──────────────────────────────────────────────────────────

  /// Register a new product. Fails with [`Error::DuplicateProduct`] if the
  /// name is taken.
  fn add_product(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Register every name in `names` that is not yet known, then return the
  /// full catalogue. Used to seed the configured product list.
  fn ensure_products(
    &self,
    names: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  /// Look a product up by name. Returns `None` if not found.
  fn get_product<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + 'a;

  /// All products in registration order.
  fn list_products(
    &self,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  // ── Fact writes ───────────────────────────────────────────────────────

  /// Insert or overwrite the fact for (`period`, `entry.product`).
  fn upsert_fact(
    &self,
    period: Period,
    entry: FactEntry,
  ) -> impl Future<Output = Result<Fact, Self::Error>> + Send + '_;

  /// Upsert every entry of a submission atomically.
  ///
  /// Returns [`Error::PeriodLocked`], [`Error::UnknownProduct`] or
  /// [`Error::InvalidQuantity`] without writing anything if any entry (or
  /// the period itself) is rejected.
  fn upsert_batch(
    &self,
    period: Period,
    entries: Vec<FactEntry>,
  ) -> impl Future<Output = Result<Vec<Fact>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The sparse facts recorded for `period`.
  fn facts_for_period(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<PeriodSheet, Self::Error>> + Send + '_;

  /// Every stored fact, ordered by period and then product.
  fn all_facts(
    &self,
  ) -> impl Future<Output = Result<Vec<Fact>, Self::Error>> + Send + '_;

  /// The set of periods holding at least one fact.
  fn distinct_periods_with_data(
    &self,
  ) -> impl Future<Output = Result<BTreeSet<Period>, Self::Error>> + Send + '_;
}
