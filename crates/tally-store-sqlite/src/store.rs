//! [`SqliteStore`]: a [`LedgerStore`] backed by one SQLite file.

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tally_core::{
  fact::{Fact, FactEntry, PeriodSheet, Quantities},
  gate::PeriodGate,
  period::Period,
  product::{Product, normalize_name},
  store::LedgerStore,
};

use crate::{
  Error, Result,
  encode::{RawFact, RawProduct, decode_period, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally ledger backed by a single SQLite file.
///
/// Clones share one background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helpers ───────────────────────────────────────────────────────────

/// Every (year, month) pair that holds at least one fact.
fn entered_periods(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<(i32, u32)>> {
  let mut stmt = conn.prepare("SELECT DISTINCT year, month FROM facts")?;
  stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect()
}

fn to_period_set(
  pairs: Vec<(i32, u32)>,
) -> std::result::Result<BTreeSet<Period>, tally_core::Error> {
  pairs
    .into_iter()
    .map(|(year, month)| Period::new(year, month))
    .collect()
}

fn product_id_for(
  conn: &rusqlite::Connection,
  name: &str,
) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT product_id FROM products WHERE name = ?1",
      rusqlite::params![name],
      |row| row.get(0),
    )
    .optional()
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Products ──────────────────────────────────────────────────────────────

  async fn add_product(&self, name: String) -> Result<Product> {
    let product = Product {
      product_id: Uuid::new_v4(),
      name:       normalize_name(&name)?,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(product.product_id);
    let name_str = product.name.clone();
    let at_str   = encode_dt(product.created_at);

    self
      .conn
      .call(move |conn| {
        if product_id_for(conn, &name_str)?.is_some() {
          return Ok(Err(tally_core::Error::DuplicateProduct(name_str)));
        }
        conn.execute(
          "INSERT INTO products (product_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    tracing::info!(product = %product.name, "registered product");
    Ok(product)
  }

  async fn ensure_products(&self, names: Vec<String>) -> Result<Vec<Product>> {
    let names = names
      .iter()
      .map(|n| normalize_name(n))
      .collect::<std::result::Result<Vec<_>, _>>()?;
    let at_str = encode_dt(Utc::now());

    let added: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut added = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO products (product_id, name, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (name) DO NOTHING",
          )?;
          for name in &names {
            added += stmt.execute(rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              name,
              at_str
            ])?;
          }
        }
        tx.commit()?;
        Ok(added)
      })
      .await?;

    if added > 0 {
      tracing::info!(added, "seeded products");
    }
    self.list_products().await
  }

  async fn get_product<'a>(&'a self, name: &'a str) -> Result<Option<Product>> {
    let name = name.trim().to_owned();

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT product_id, name, created_at FROM products WHERE name = ?1",
              rusqlite::params![name],
              RawProduct::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let raws: Vec<RawProduct> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT product_id, name, created_at FROM products ORDER BY rowid")?;
        let rows = stmt
          .query_map([], RawProduct::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  // ── Fact writes ───────────────────────────────────────────────────────────

  async fn upsert_fact(&self, period: Period, entry: FactEntry) -> Result<Fact> {
    let product = entry.product.clone();
    self
      .upsert_batch(period, vec![entry])
      .await?
      .pop()
      .ok_or(Error::Core(tally_core::Error::UnknownProduct(product)))
  }

  async fn upsert_batch(
    &self,
    period:      Period,
    mut entries: Vec<FactEntry>,
  ) -> Result<Vec<Fact>> {
    for entry in &mut entries {
      entry.product = normalize_name(&entry.product)?;
      entry.validate()?;
    }

    let count      = entries.len();
    let updated_at = encode_dt(Utc::now());
    let (year, month) = (period.year(), period.month());

    // Gate check, product lookup and writes share one IMMEDIATE transaction,
    // so the watermark cannot move between the check and the write.
    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let entered = match to_period_set(entered_periods(&tx)?) {
          Ok(entered) => entered,
          Err(e) => return Ok(Err(e)),
        };
        if let Err(e) = PeriodGate::new(&entered).check(period) {
          return Ok(Err(e));
        }

        let mut product_ids = Vec::with_capacity(entries.len());
        for entry in &entries {
          match product_id_for(&tx, &entry.product)? {
            Some(id) => product_ids.push(id),
            None => {
              return Ok(Err(tally_core::Error::UnknownProduct(entry.product.clone())));
            }
          }
        }

        let mut raws = Vec::with_capacity(entries.len());
        {
          let mut stmt = tx.prepare(
            "INSERT INTO facts (year, month, product_id, sold, stock, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (year, month, product_id) DO UPDATE SET
               sold       = excluded.sold,
               stock      = excluded.stock,
               updated_at = excluded.updated_at",
          )?;
          for (entry, product_id) in entries.into_iter().zip(product_ids) {
            let sold = entry.sold_or_zero();
            stmt.execute(rusqlite::params![
              year,
              month,
              product_id,
              sold,
              entry.stock,
              updated_at
            ])?;
            raws.push(RawFact {
              year,
              month,
              product_id,
              product: entry.product,
              sold,
              stock: entry.stock,
              updated_at: updated_at.clone(),
            });
          }
        }

        tx.commit()?;
        Ok(Ok(raws))
      })
      .await
      .map_err(Error::Database)?
      .inspect_err(|e| tracing::warn!(%period, error = %e, "rejected submission"))?;

    tracing::info!(%period, entries = count, "recorded submission");
    raws.into_iter().map(RawFact::into_fact).collect()
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn facts_for_period(&self, period: Period) -> Result<PeriodSheet> {
    let (year, month) = (period.year(), period.month());

    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM facts f JOIN products p ON p.product_id = f.product_id
           WHERE f.year = ?1 AND f.month = ?2
           ORDER BY p.rowid",
          RawFact::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![year, month], RawFact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut sheet = PeriodSheet::new(period);
    for raw in raws {
      let fact = raw.into_fact()?;
      sheet.insert(fact.product, Quantities { sold: fact.sold, stock: fact.stock });
    }
    Ok(sheet)
  }

  async fn all_facts(&self) -> Result<Vec<Fact>> {
    let raws: Vec<RawFact> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {} FROM facts f JOIN products p ON p.product_id = f.product_id
           ORDER BY f.year, f.month, p.rowid",
          RawFact::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawFact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_fact).collect()
  }

  async fn distinct_periods_with_data(&self) -> Result<BTreeSet<Period>> {
    let pairs = self
      .conn
      .call(|conn| Ok(entered_periods(conn)?))
      .await?;

    pairs
      .into_iter()
      .map(|(year, month)| decode_period(year, month))
      .collect()
  }
}
