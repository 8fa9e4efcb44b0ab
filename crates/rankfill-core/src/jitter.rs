//! Independent bounded jitter and derived products
//! No ordering guarantee, every entity is perturbed on its own

use rand::Rng;

use crate::error::{PerturbError, Result};
use crate::math::{apply_fluctuation, apply_offset, FluctuationBound, ValueRange};
use crate::score_set::ScoreSet;

/// Scale each value by its own random multiplier from `bound`, then clamp
pub fn jitter_relative<R: Rng + ?Sized>(
  scores: &ScoreSet,
  bound: FluctuationBound,
  range: ValueRange,
  rng: &mut R,
) -> Result<ScoreSet> {
  scores.ensure_finite()?;
  Ok(scores
    .iter()
    .map(|(id, value)| (id, range.clamp(apply_fluctuation(value, bound, rng))))
    .collect())
}

/// Shift each value by its own uniform offset in [-delta, +delta], then clamp
pub fn jitter_absolute<R: Rng + ?Sized>(
  scores: &ScoreSet,
  delta: f64,
  range: ValueRange,
  rng: &mut R,
) -> Result<ScoreSet> {
  if !delta.is_finite() || delta < 0.0 {
    return Err(PerturbError::InvalidDelta { delta });
  }
  scores.ensure_finite()?;
  Ok(scores
    .iter()
    .map(|(id, value)| (id, range.clamp(apply_offset(value, delta, rng))))
    .collect())
}

/// Outcome of recomputing a derived field
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedProduct {
  pub values: ScoreSet,
  /// Identifiers missing from a base field, jittered from their stale value instead
  pub fallbacks: Vec<String>,
}

/// Recompute `stale[k] = left[k] * right[k]` from already-perturbed base fields
///
/// # Arguments
/// * `stale` - Previous derived values, defines the key set and the fallback value
/// * `left` - First perturbed base field
/// * `right` - Second perturbed base field
/// * `fallback` - Swing for identifiers absent from either base field
/// * `range` - Clamp for every output
pub fn derive_product<R: Rng + ?Sized>(
  stale: &ScoreSet,
  left: &ScoreSet,
  right: &ScoreSet,
  fallback: FluctuationBound,
  range: ValueRange,
  rng: &mut R,
) -> Result<DerivedProduct> {
  stale.ensure_finite()?;
  left.ensure_finite()?;
  right.ensure_finite()?;

  let mut values = ScoreSet::with_capacity(stale.len());
  let mut fallbacks = Vec::new();

  for (id, stale_value) in stale.iter() {
    let value = match (left.get(id), right.get(id)) {
      (Some(a), Some(b)) => a * b,
      _ => {
        fallbacks.push(id.to_string());
        apply_fluctuation(stale_value, fallback, rng)
      }
    };
    values.insert(id, range.clamp(value));
  }

  Ok(DerivedProduct { values, fallbacks })
}
