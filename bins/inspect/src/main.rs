//! Report how brand aliases ended up after a merge
//! Reads the first timeline entry of one product and prints, per brand group,
//! which identifiers are left and what the canonical entry carries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rankfill_config::Config;
use rankfill_dataset::inspect::DEFAULT_LEADING_BRANDS;
use rankfill_dataset::{default_groups, inspect_product, load_dataset, BrandGroup};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "inspect", about = "Inspect merged brand entries of one product")]
struct Args {
  /// Product to inspect
  #[arg(long)]
  product: String,

  /// Dataset to read (RANKFILL_INPUT)
  #[arg(long)]
  input: Option<PathBuf>,

  /// Brand group as LABEL=CANONICAL:pattern,pattern (repeatable)
  #[arg(long = "group")]
  groups: Vec<String>,

  /// Number of brands to list
  #[arg(long, default_value_t = DEFAULT_LEADING_BRANDS)]
  limit: usize,

  /// Print the report as JSON
  #[arg(long)]
  json: bool,
}

fn main() -> Result<()> {
  let args = Args::parse();
  let mut config = Config::load_env().context("failed to load configuration")?;
  if let Some(input) = &args.input {
    config.input = Some(input.clone());
  }

  rankfill_telemetry::init(&config.log)?;

  let groups = if args.groups.is_empty() {
    default_groups()
  } else {
    args.groups.iter().map(|raw| BrandGroup::parse(raw)).collect::<Result<Vec<_>, _>>()?
  };

  let input = config.require_input()?;
  let dataset = load_dataset(input).with_context(|| format!("failed to load {}", input.display()))?;
  debug!(products = dataset.len(), groups = groups.len(), "dataset loaded");

  let report = inspect_product(&dataset, &args.product, &groups, args.limit)?;
  if args.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print!("{}", report);
  }
  Ok(())
}
