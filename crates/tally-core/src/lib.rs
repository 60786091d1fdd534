//! Core types and trait definitions for the Tally period ledger.
//!
//! This crate is free of HTTP and database dependencies. It holds the domain
//! model (products, periods, facts), the [`gate::PeriodGate`] that decides
//! which period accepts writes, and the pure aggregation functions behind
//! every report.

// `LedgerStore` spells out `Send` futures itself; backends implement it with
// plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod error;
pub mod fact;
pub mod gate;
pub mod period;
pub mod product;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
