mod app;
mod auth;
mod cache;
mod card;
mod config;
mod event;
mod query;
mod sheets;
mod ui;

use chrono::NaiveDate;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheetdash")]
#[command(about = "A terminal dashboard for spreadsheet-backed team checklists")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/sheetdash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Global check date, YYYY-MM-DD (default: today)
  #[arg(short, long)]
  date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // The terminal belongs to the TUI, so logs go to a file
  let _log_guard = init_tracing()?;

  let config = config::Config::load(args.config.as_deref())?;

  let mut app = app::App::new(config, args.date)?;
  app.run().await?;

  Ok(())
}

/// Write tracing output to a file in the platform data directory.
/// Filtering follows RUST_LOG, defaulting to info.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;
  let log_dir = data_dir.join("sheetdash");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::never(log_dir, "sheetdash.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
