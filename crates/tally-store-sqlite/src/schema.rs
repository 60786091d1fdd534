//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Products are only ever added; rowid gives registration order.
CREATE TABLE IF NOT EXISTS products (
    product_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

-- At most one row per (period, product); resubmissions overwrite in place.
-- No DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS facts (
    year        INTEGER NOT NULL,
    month       INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    product_id  TEXT NOT NULL REFERENCES products(product_id),
    sold        INTEGER NOT NULL DEFAULT 0 CHECK (sold >= 0),
    stock       INTEGER CHECK (stock IS NULL OR stock >= 0),
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    UNIQUE (year, month, product_id)
);

CREATE INDEX IF NOT EXISTS facts_period_idx ON facts(year, month);

PRAGMA user_version = 1;
";
