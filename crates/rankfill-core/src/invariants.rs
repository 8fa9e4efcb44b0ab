//! Invariant assertions for synthesized score sets
//! Synthesis checks these before a perturbed set is written back into a record

use crate::error::{PerturbError, Result};
use crate::math::ValueRange;
use crate::score_set::ScoreSet;

/// Assert both sets carry exactly the same identifiers
pub fn assert_same_keys(original: &ScoreSet, perturbed: &ScoreSet) -> Result<()> {
  if let Some(id) = original.keys().find(|id| !perturbed.contains_key(id)) {
    return Err(PerturbError::KeySetMismatch { id: id.to_string() });
  }
  if let Some(id) = perturbed.keys().find(|id| !original.contains_key(id)) {
    return Err(PerturbError::KeySetMismatch { id: id.to_string() });
  }
  Ok(())
}

/// Assert no strict pair of `original` is inverted in `perturbed`
///
/// Ties in `original` may resolve either way. A pair that ends up equal is
/// not an inversion (non-positive inputs all land on the zero floor).
///
/// # Arguments
/// * `original` - Set the ranking is taken from
/// * `perturbed` - Set produced from it, with the same identifiers
pub fn assert_strict_order_preserved(original: &ScoreSet, perturbed: &ScoreSet) -> Result<()> {
  assert_same_keys(original, perturbed)?;
  original.ensure_finite()?;

  // lowest perturbed value among all strictly higher groups, and who holds it
  let mut floor_above: Option<(&str, f64)> = None;
  let mut group: Option<(&str, f64)> = None;
  let mut prev_original: Option<f64> = None;

  for (id, original_value) in original.ranked() {
    let value = perturbed.get(id).ok_or_else(|| PerturbError::KeySetMismatch { id: id.to_string() })?;

    if prev_original.map_or(false, |p| original_value < p) {
      floor_above = match (floor_above, group) {
        (Some(a), Some(g)) if a.1 <= g.1 => Some(a),
        (_, g) => g.or(floor_above),
      };
      group = None;
    }

    if let Some((higher, limit)) = floor_above {
      if value > limit {
        return Err(PerturbError::RankInversion { higher: higher.to_string(), lower: id.to_string() });
      }
    }

    group = match group {
      Some(g) if g.1 <= value => Some(g),
      _ => Some((id, value)),
    };
    prev_original = Some(original_value);
  }

  Ok(())
}

/// Assert every value sits inside `range`
pub fn assert_within_range(scores: &ScoreSet, range: ValueRange) -> Result<()> {
  match scores.iter().find(|(_, value)| !range.contains(*value)) {
    Some((id, value)) => Err(PerturbError::OutOfRange { id: id.to_string(), value }),
    None => Ok(()),
  }
}
