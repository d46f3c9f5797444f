//! Partlink REST Server
//!
//! HTTP REST API over the merged spare-parts table. The table is built once
//! at startup and rebuilt when the source files change.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use partlink::server::start_server;
use partlink::{Catalog, Config};

#[derive(Parser)]
#[command(name = "partlink_server")]
#[command(about = "Partlink REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, default_value = "127.0.0.1:3000")]
  bind: SocketAddr,

  /// JSON config file naming the source spreadsheets
  #[arg(long)]
  config: Option<PathBuf>,

  /// Spare-parts workbook, csv file or directory of csv files
  #[arg(long)]
  primary: Option<PathBuf>,

  /// Recommendation workbook or csv file
  #[arg(long)]
  recommendations: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let default = if args.verbose { "partlink=debug,tower_http=debug,info" } else { "partlink=info,warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let mut config = match &args.config {
    Some(path) => Config::load_from_file(path)?.with_env_overrides(),
    None => Config::load()?,
  };
  if let Some(primary) = args.primary {
    config.primary = primary;
  }
  if let Some(recommendations) = args.recommendations {
    config.recommendations = recommendations;
  }

  info!("Starting Partlink REST Server v{}", env!("CARGO_PKG_VERSION"));
  info!("Primary source: {}", config.primary.display());
  info!("Recommendation source: {}", config.recommendations.display());

  let catalog = Arc::new(tokio::task::spawn_blocking(move || Catalog::open(config)).await??);

  info!("Binding to address: {}", args.bind);
  start_server(args.bind, catalog).await?;

  Ok(())
}
