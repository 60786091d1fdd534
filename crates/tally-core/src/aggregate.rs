//! Read-only metrics derived from recorded facts.
//!
//! Everything here is a pure function over facts that have already been
//! fetched. Missing (period, product) entries are filled with zeros at read
//! time; nothing is materialised in storage. Every report recomputes from a
//! full scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  fact::Fact,
  period::Period,
  product::Product,
  settings::LedgerSettings,
  store::LedgerStore,
};

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Sum of `sold` per product over `periods`. Every product in `products`
/// appears in the result, with 0 when it has no facts in those periods.
/// Sums saturate at `i64::MAX`.
pub fn totals_by_product<'a>(
  products: impl IntoIterator<Item = &'a str>,
  facts: impl IntoIterator<Item = &'a Fact>,
  periods: &[Period],
) -> BTreeMap<String, i64> {
  let mut totals: BTreeMap<String, i64> =
    products.into_iter().map(|name| (name.to_owned(), 0)).collect();
  for fact in facts {
    if periods.contains(&fact.period) {
      let total = totals.entry(fact.product.clone()).or_insert(0);
      *total = total.saturating_add(fact.sold);
    }
  }
  totals
}

/// Average sold per period: `total / period_count`, or 0 when nothing sold.
pub fn apus(total: i64, period_count: u32) -> f64 {
  if total > 0 && period_count > 0 {
    total as f64 / f64::from(period_count)
  } else {
    0.0
  }
}

/// `total` as a percentage of `grand_total`; 0 when the grand total is 0.
pub fn percent_of_total(total: i64, grand_total: i64) -> f64 {
  if grand_total > 0 {
    total as f64 / grand_total as f64 * 100.0
  } else {
    0.0
  }
}

/// Stock left after `total_sold`. Negative means oversold and is reported
/// as-is.
pub fn remaining(stock: i64, total_sold: i64) -> i64 { stock.saturating_sub(total_sold) }

// ─── Report ──────────────────────────────────────────────────────────────────

/// One product's line in a yearly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
  pub product:   String,
  pub total:     i64,
  pub apus:      f64,
  pub percent:   f64,
  /// Opening stock: the count from the earliest period of the year that has
  /// one.
  pub stock:     Option<i64>,
  pub remaining: i64,
}

/// Dense monthly sales for one product, one value per report period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSeries {
  pub product: String,
  pub monthly: Vec<i64>,
}

/// The report for one year. Built from the facts on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub year:        i32,
  pub periods:     Vec<Period>,
  pub rows:        Vec<ReportRow>,
  pub grand_total: i64,
  pub series:      Vec<ProductSeries>,
}

impl Report {
  /// Build the report for `year` from the full product list and a fact scan.
  /// Rows follow the order of `products`.
  pub fn build(
    products: &[Product],
    facts: &[Fact],
    year: i32,
    settings: &LedgerSettings,
  ) -> Self {
    let periods = Period::months_of(year);
    let totals = totals_by_product(
      products.iter().map(|p| p.name.as_str()),
      facts,
      &periods,
    );
    let grand_total = totals.values().fold(0_i64, |acc, t| acc.saturating_add(*t));

    let rows = products
      .iter()
      .map(|product| {
        let total = totals.get(&product.name).copied().unwrap_or(0);
        let stock = opening_stock(&product.name, facts, &periods);
        ReportRow {
          product: product.name.clone(),
          total,
          apus: apus(total, settings.apus_periods),
          percent: percent_of_total(total, grand_total),
          stock,
          remaining: remaining(stock.unwrap_or(0), total),
        }
      })
      .collect();

    let series = products
      .iter()
      .map(|product| ProductSeries {
        product: product.name.clone(),
        monthly: periods
          .iter()
          .map(|period| sold_in(&product.name, *period, facts))
          .collect(),
      })
      .collect();

    Self { year, periods, rows, grand_total, series }
  }

  /// Load products and facts from `store` and build the report for `year`.
  pub async fn load<S: LedgerStore>(
    store: &S,
    year: i32,
    settings: &LedgerSettings,
  ) -> Result<Self, S::Error> {
    let products = store.list_products().await?;
    let facts = store.all_facts().await?;
    tracing::debug!(year, facts = facts.len(), "building report");
    Ok(Self::build(&products, &facts, year, settings))
  }

  pub fn row(&self, product: &str) -> Option<&ReportRow> {
    self.rows.iter().find(|r| r.product == product)
  }
}

fn sold_in(product: &str, period: Period, facts: &[Fact]) -> i64 {
  facts
    .iter()
    .find(|f| f.period == period && f.product == product)
    .map_or(0, |f| f.sold)
}

fn opening_stock(product: &str, facts: &[Fact], periods: &[Period]) -> Option<i64> {
  facts
    .iter()
    .filter(|f| f.product == product && periods.contains(&f.period))
    .filter_map(|f| f.stock.map(|stock| (f.period, stock)))
    .min_by_key(|(period, _)| *period)
    .map(|(_, stock)| stock)
}
