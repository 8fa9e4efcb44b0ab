//! Rank-preserving perturbation
//! Values are jittered independently, then an epsilon walk down the original
//! ranking pushes any value that crept past its predecessor back below it

use rand::Rng;

use crate::constants::{RANK_EPSILON, UNIT_FLOOR};
use crate::error::Result;
use crate::math::{apply_fluctuation, FluctuationBound, ValueRange};
use crate::score_set::ScoreSet;

/// One entity in original rank order, before repair
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
  pub id: String,
  pub original: f64,
  pub candidate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankPreservingPerturber {
  epsilon: f64,
  range: ValueRange,
}

impl Default for RankPreservingPerturber {
  fn default() -> Self {
    Self { epsilon: RANK_EPSILON, range: ValueRange::NonNegative }
  }
}

impl RankPreservingPerturber {
  pub fn new(range: ValueRange) -> Self {
    Self { range, ..Self::default() }
  }

  pub fn with_epsilon(mut self, epsilon: f64) -> Self {
    self.epsilon = epsilon.abs();
    self
  }

  pub fn epsilon(&self) -> f64 {
    self.epsilon
  }

  pub fn range(&self) -> ValueRange {
    self.range
  }

  /// Perturb every value in `scores` within `bound` and keep the strict rank order
  ///
  /// # Arguments
  /// * `scores` - Original values, left untouched
  /// * `bound` - Fractional swing applied to each value
  /// * `rng` - Random source, one draw per entity
  ///
  /// # Returns
  /// A new set with the identical key set, in the input's storage order.
  /// Empty input gives an empty set.
  pub fn perturb<R: Rng + ?Sized>(
    &self,
    scores: &ScoreSet,
    bound: FluctuationBound,
    rng: &mut R,
  ) -> Result<ScoreSet> {
    let candidates = self.draw_candidates(scores, bound, rng)?;
    let repaired = self.repair_ranks(candidates);

    Ok(scores
      .keys()
      .filter_map(|id| repaired.get(id).map(|value| (id, value)))
      .collect())
  }

  /// Rank `scores` descending and draw one clamped candidate per entity
  ///
  /// Candidates are not yet rank-repaired, each one lies in the bound's
  /// window around its original value (after clamping).
  pub fn draw_candidates<R: Rng + ?Sized>(
    &self,
    scores: &ScoreSet,
    bound: FluctuationBound,
    rng: &mut R,
  ) -> Result<Vec<RankedCandidate>> {
    scores.ensure_finite()?;

    Ok(scores
      .ranked()
      .into_iter()
      .map(|(id, original)| RankedCandidate {
        id: id.to_string(),
        original,
        candidate: self.range.clamp(apply_fluctuation(original, bound, rng)),
      })
      .collect())
  }

  /// Walk candidates in original rank order and restore strict ordering
  ///
  /// An entity strictly below the group above it is held at least `epsilon`
  /// under the smallest repaired value of that group. Where that would cross
  /// the zero floor it is held halfway between the floor and that value
  /// instead. Tied entities are not ordered among themselves, but each one is
  /// still held under the group above.
  ///
  /// # Returns
  /// Repaired values in rank order
  pub fn repair_ranks(&self, ranked: Vec<RankedCandidate>) -> ScoreSet {
    let mut repaired = ScoreSet::with_capacity(ranked.len());

    // smallest repaired value of the nearest strictly greater group
    let mut ceiling: Option<f64> = None;
    // smallest repaired value of the group being walked
    let mut group_min = f64::INFINITY;
    let mut prev: Option<(f64, f64)> = None;

    for RankedCandidate { id, original, candidate } in ranked {
      let mut value = candidate;

      if let Some((prev_original, prev_value)) = prev {
        if original < prev_original {
          ceiling = Some(group_min);
          group_min = f64::INFINITY;
        } else if original > prev_original {
          // unreachable for a descending sort of finite values
          value = value.max(prev_value + self.epsilon);
          ceiling = None;
          group_min = f64::INFINITY;
        }
      }

      if let Some(limit) = ceiling {
        value = value.min(self.cap_below(limit));
      }
      value = self.range.clamp(value);

      group_min = group_min.min(value);
      prev = Some((original, value));
      repaired.insert(id, value);
    }

    repaired
  }

  /// Largest value allowed strictly under `limit`
  /// Only a `limit` already on the floor leaves no room, and yields the floor.
  fn cap_below(&self, limit: f64) -> f64 {
    let cap = limit - self.epsilon;
    if cap > UNIT_FLOOR {
      cap
    } else {
      UNIT_FLOOR + (limit - UNIT_FLOOR) / 2.0
    }
  }
}

/// Rank-preserving perturbation with the default epsilon and a non-negative clamp
pub fn perturb<R: Rng + ?Sized>(
  scores: &ScoreSet,
  bound: FluctuationBound,
  rng: &mut R,
) -> Result<ScoreSet> {
  RankPreservingPerturber::default().perturb(scores, bound, rng)
}
