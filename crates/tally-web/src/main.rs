//! tally-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! ledger, seeds the product catalogue and serves the web UI over HTTP.
//!
//! # Offline export
//!
//! ```text
//! cargo run -p tally-web --bin tally-server -- export --year 2025 --out report.xlsx
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tally_core::{aggregate::Report, gate::PeriodGate, period::Period, store::LedgerStore};
use tally_store_sqlite::SqliteStore;
use tally_web::{AppState, ServerConfig, export, templates::Templates};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tally monthly sales ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the web UI and JSON API (the default).
  Serve,
  /// Write the report for one year to an .xlsx file and exit.
  Export {
    /// Year to report on; defaults to the year of the latest entered period.
    #[arg(long)]
    year: Option<i32>,
    #[arg(long, default_value = "sales-report.xlsx")]
    out:  PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // File first, then `TALLY_PORT`, `TALLY_LEDGER__APUS_PERIODS`, ...
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("TALLY")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("products")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg
    .ledger
    .validate()
    .context("invalid ledger settings")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let products = store
    .ensure_products(server_cfg.products.clone())
    .await
    .context("failed to seed products")?;
  tracing::info!(count = products.len(), "product catalogue ready");

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::Export { year, out } => export_to(&store, &server_cfg, year, &out).await,
  }
}

async fn serve(store: SqliteStore, cfg: ServerConfig) -> anyhow::Result<()> {
  let state = AppState {
    store:     Arc::new(store),
    settings:  Arc::new(cfg.ledger.clone()),
    templates: Arc::new(Templates::new().context("failed to compile templates")?),
  };

  let app = tally_web::router(state);
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn export_to(
  store: &SqliteStore,
  cfg: &ServerConfig,
  year: Option<i32>,
  out: &Path,
) -> anyhow::Result<()> {
  let year = match year {
    Some(year) => Period::check_year(year)?,
    None => PeriodGate::load(store).await?.default_year(),
  };
  let report = Report::load(store, year, &cfg.ledger).await?;
  let bytes = export::workbook(&report).context("failed to build workbook")?;
  std::fs::write(out, bytes).with_context(|| format!("failed to write {out:?}"))?;
  tracing::info!(year, path = %out.display(), "report exported");
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
