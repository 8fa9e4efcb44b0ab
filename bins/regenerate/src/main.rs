//! Backfill missing days of the brand-ranking dataset
//!
//! Every product gets one synthesized record per day of the configured range,
//! derived from its base-day record. Settings come from the environment
//! (see `rankfill-config`), flags override them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rankfill_config::{parse_date, Config};
use rankfill_dataset::{
  backfill_dataset, date_range, load_dataset, load_plan, save_dataset, BackfillRequest, SynthesisPlan,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "regenerate", about = "Synthesize missing days of a brand-ranking dataset")]
struct Args {
  /// Dataset to read (RANKFILL_INPUT)
  #[arg(long)]
  input: Option<PathBuf>,

  /// Where to write the result (RANKFILL_OUTPUT, defaults to the input)
  #[arg(long)]
  output: Option<PathBuf>,

  /// Day the synthesized records are derived from, YYYY-MM-DD
  #[arg(long)]
  base_date: Option<String>,

  /// First synthesized day, YYYY-MM-DD
  #[arg(long)]
  start: Option<String>,

  /// Last synthesized day, YYYY-MM-DD
  #[arg(long)]
  end: Option<String>,

  /// Random seed
  #[arg(long)]
  seed: Option<u64>,

  /// JSON synthesis plan replacing the built-in one
  #[arg(long)]
  plan: Option<PathBuf>,

  /// Run everything but do not write the output
  #[arg(long)]
  dry_run: bool,
}

fn apply_overrides(mut config: Config, args: &Args) -> Result<Config> {
  if let Some(input) = &args.input {
    config.input = Some(input.clone());
  }
  if let Some(output) = &args.output {
    config.output = Some(output.clone());
  }
  if let Some(raw) = &args.base_date {
    config.base_date = parse_date("--base-date", raw)?;
  }
  if let Some(raw) = &args.start {
    config.start_date = parse_date("--start", raw)?;
  }
  if let Some(raw) = &args.end {
    config.end_date = parse_date("--end", raw)?;
  }
  if let Some(seed) = args.seed {
    config.seed = seed;
  }
  if let Some(plan) = &args.plan {
    config.plan = Some(plan.clone());
  }
  config.validate()?;
  Ok(config)
}

fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::load_env().context("failed to load configuration")?;
  let config = apply_overrides(config, &args)?;

  rankfill_telemetry::init(&config.log)?;

  let input = config.require_input()?.clone();
  let output = config.output_or_input()?.clone();

  let plan = match &config.plan {
    Some(path) => load_plan(path).with_context(|| format!("failed to load plan {}", path.display()))?,
    None => SynthesisPlan::brand_ranking()?,
  };

  let dates = date_range(config.start_date, config.end_date);
  info!(
    input = %input.display(),
    base = %config.base_date,
    start = %config.start_date,
    end = %config.end_date,
    seed = config.seed,
    "regenerating dataset"
  );

  let dataset = load_dataset(&input).with_context(|| format!("failed to load {}", input.display()))?;

  let request = BackfillRequest { base_date: config.base_date, dates, plan };
  let mut rng = StdRng::seed_from_u64(config.seed);
  let (updated, summary) = backfill_dataset(&dataset, &request, &mut rng).context("backfill failed")?;

  if args.dry_run {
    warn!("dry run, output not written");
  } else {
    save_dataset(&output, &updated).with_context(|| format!("failed to write {}", output.display()))?;
    info!(output = %output.display(), "dataset written");
  }

  info!(
    products = summary.products,
    days = summary.days_generated,
    skipped = summary.skipped.len(),
    base_fallbacks = summary.base_fallbacks.len(),
    "done, base-day records left unchanged"
  );
  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}
