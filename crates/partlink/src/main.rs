use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use partlink::catalog;
use partlink::images::ImageLookup;
use partlink::search::{Query, StatusKind};
use partlink::Config;

mod commands;

use commands::{Lookup, View};

#[derive(Parser)]
#[command(name = "partlink")]
#[command(about = "Partlink - Spare Parts Lookup\nSearch the merged spare-parts list by code, model or product name")]
#[command(version)]
struct Cli {
  /// JSON config file naming the source spreadsheets
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Spare-parts workbook, csv file or directory of csv files
  #[arg(long, global = true)]
  primary: Option<PathBuf>,

  /// Recommendation workbook or csv file
  #[arg(long, global = true)]
  recommendations: Option<PathBuf>,

  /// Print result rows as a one-line-per-part list instead of cards
  #[arg(short, long, global = true)]
  summary: bool,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Look up spare parts by code
  Code {
    /// Spare part code
    code: String,
    /// Match any code containing the text instead of the exact code
    #[arg(short, long)]
    contains: bool,
  },
  /// Search model, product name and CN product name
  Search {
    /// Text to look for
    text: String,
  },
  /// List model options for the picker
  Models {
    /// Only models in this category; "All" means every category unless a sheet is named All
    #[arg(short, long)]
    category: Option<String>,
    /// Only models whose model or product name contains this keyword
    #[arg(short, long, default_value = "")]
    keyword: String,
  },
  /// List every spare part of one model
  Model {
    /// Model, exactly as listed by `models`
    model: String,
  },
  /// List the categories (one per source sheet)
  Categories,
  /// Show the resolved product and spare part images for a code
  Image {
    /// Spare part code
    code: String,
  },
}

fn init_logging(verbose: bool) {
  let default = if verbose { "partlink=debug,warn" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
  let mut config = match &cli.config {
    Some(path) => Config::load_from_file(path)?.with_env_overrides(),
    None => Config::load()?,
  };
  if let Some(primary) = &cli.primary {
    config.primary = primary.clone();
  }
  if let Some(recommendations) = &cli.recommendations {
    config.recommendations = recommendations.clone();
  }
  Ok(config)
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let config = resolve_config(&cli)?;
  let table = catalog::build_table(&config)?;

  let lookup = Lookup {
    table: &table,
    images: ImageLookup::new(&config.images_dir),
    view: if cli.summary { View::Summary } else { View::Cards },
  };

  let outcome = match cli.command {
    Commands::Code { code, contains } => {
      let query = if contains { Query::CodeContains(code) } else { Query::ExactCode(code) };
      lookup.run(&query)
    }
    Commands::Search { text } => lookup.run(&Query::Text(text)),
    Commands::Models { category, keyword } => lookup.models(category.as_deref(), &keyword),
    Commands::Model { model } => lookup.run(&Query::Model(model)),
    Commands::Categories => lookup.categories(),
    Commands::Image { code } => lookup.image(&code),
  };

  if outcome == StatusKind::Error {
    process::exit(2);
  }

  Ok(())
}
