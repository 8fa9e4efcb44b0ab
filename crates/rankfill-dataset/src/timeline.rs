//! Timeline backfill
//! Synthesizes a range of days for every product from one known base day

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DatasetError, Result};
use crate::model::{Dataset, TimelineEntry};
use crate::plan::SynthesisPlan;
use crate::synthesis::synthesize_day;

/// Every day from `start` to `end`, inclusive
/// Empty when `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
  start.iter_days().take_while(|day| *day <= end).collect()
}

/// Pick the entry the synthesized days are derived from
///
/// # Returns
/// The entry dated `base_date`, otherwise the last entry of the timeline,
/// `None` for an empty timeline. The flag is true when the fallback was used.
pub fn select_base(timeline: &[TimelineEntry], base_date: NaiveDate) -> Option<(&TimelineEntry, bool)> {
  match timeline.iter().find(|entry| entry.date() == base_date) {
    Some(entry) => Some((entry, false)),
    None => timeline.last().map(|entry| (entry, true)),
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackfillRequest {
  pub base_date: NaiveDate,
  pub dates: Vec<NaiveDate>,
  pub plan: SynthesisPlan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillSummary {
  pub products: usize,
  pub days_generated: usize,
  /// Products whose timeline was empty
  pub skipped: Vec<String>,
  /// Products without an entry on the base date
  pub base_fallbacks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductBackfill {
  pub timeline: Vec<TimelineEntry>,
  pub base_date: NaiveDate,
  pub used_fallback_base: bool,
  pub days_generated: usize,
}

/// Synthesize `request.dates` for one product
///
/// Synthesized days replace existing entries with the same date. The base
/// entry and every other existing entry are kept; the base entry's own date
/// is never synthesized over. The result is sorted by date.
///
/// # Returns
/// `None` when the timeline is empty and there is nothing to derive from
pub fn backfill_product<R: Rng + ?Sized>(
  product: &str,
  timeline: &[TimelineEntry],
  request: &BackfillRequest,
  rng: &mut R,
) -> Result<Option<ProductBackfill>> {
  let (base, used_fallback_base) = match select_base(timeline, request.base_date) {
    Some(found) => found,
    None => return Ok(None),
  };

  if used_fallback_base {
    warn!(
      product,
      wanted = %request.base_date,
      using = %base.date(),
      "no entry on base date, using last entry as base"
    );
  }

  let mut generated = Vec::with_capacity(request.dates.len());
  for &date in &request.dates {
    if date == base.date() {
      debug!(product, %date, "skipping base date");
      continue;
    }
    let record = synthesize_day(base.record(), &request.plan, rng).map_err(|source| DatasetError::Synthesis {
      product: product.to_string(),
      date,
      source: Box::new(source),
    })?;
    debug!(product, %date, "synthesized day");
    generated.push(TimelineEntry(date, record));
  }

  let days_generated = generated.len();
  let mut merged: Vec<TimelineEntry> = timeline
    .iter()
    .filter(|entry| !generated.iter().any(|g| g.date() == entry.date()))
    .cloned()
    .collect();
  merged.extend(generated);
  // stable: duplicate existing dates keep their stored order
  merged.sort_by_key(|entry| entry.date());

  Ok(Some(ProductBackfill {
    timeline: merged,
    base_date: base.date(),
    used_fallback_base,
    days_generated,
  }))
}

/// Backfill every product of `dataset`, in stored order
///
/// # Returns
/// A new dataset plus a summary; the input dataset is left untouched
pub fn backfill_dataset<R: Rng + ?Sized>(
  dataset: &Dataset,
  request: &BackfillRequest,
  rng: &mut R,
) -> Result<(Dataset, BackfillSummary)> {
  request.plan.validate()?;

  let mut out = Dataset::new();
  let mut summary = BackfillSummary::default();

  for product in dataset.products() {
    info!(product = %product.name, entries = product.timeline.len(), "processing product");

    match backfill_product(&product.name, &product.timeline, request, rng)? {
      Some(backfill) => {
        if backfill.used_fallback_base {
          summary.base_fallbacks.push(product.name.clone());
        }
        summary.days_generated += backfill.days_generated;
        info!(
          product = %product.name,
          base = %backfill.base_date,
          generated = backfill.days_generated,
          "product backfilled"
        );
        out.insert(product.name.clone(), backfill.timeline);
      }
      None => {
        warn!(product = %product.name, "empty timeline, product left unchanged");
        summary.skipped.push(product.name.clone());
        out.insert(product.name.clone(), product.timeline.clone());
      }
    }
    summary.products += 1;
  }

  Ok((out, summary))
}
