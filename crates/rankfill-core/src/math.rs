//! Pure numeric helpers for value perturbation
//! Randomness is always supplied by the caller, nothing here touches global state

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{UNIT_CEILING, UNIT_FLOOR};
use crate::error::{PerturbError, Result};

/// Allowed fractional swing of a value
/// A value may be scaled by any factor in [1 + min_percent, 1 + max_percent]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct FluctuationBound {
  min_percent: f64,
  max_percent: f64,
}

impl FluctuationBound {
  pub fn new(min_percent: f64, max_percent: f64) -> Result<Self> {
    if !min_percent.is_finite() {
      return Err(PerturbError::NonFiniteBound { which: "min_percent" });
    }
    if !max_percent.is_finite() {
      return Err(PerturbError::NonFiniteBound { which: "max_percent" });
    }
    if min_percent > max_percent {
      return Err(PerturbError::InvalidBound { min: min_percent, max: max_percent });
    }
    Ok(Self { min_percent, max_percent })
  }

  /// +/- `swing` around the original value
  pub fn symmetric(swing: f64) -> Result<Self> {
    Self::new(-swing.abs(), swing.abs())
  }

  pub fn min_percent(&self) -> f64 {
    self.min_percent
  }

  pub fn max_percent(&self) -> f64 {
    self.max_percent
  }

  /// Multiplier window (1 + min, 1 + max)
  pub fn multipliers(&self) -> (f64, f64) {
    (1.0 + self.min_percent, 1.0 + self.max_percent)
  }
}

impl TryFrom<(f64, f64)> for FluctuationBound {
  type Error = PerturbError;

  fn try_from((min, max): (f64, f64)) -> Result<Self> {
    Self::new(min, max)
  }
}

impl From<FluctuationBound> for (f64, f64) {
  fn from(bound: FluctuationBound) -> Self {
    (bound.min_percent, bound.max_percent)
  }
}

/// Clamp applied to every synthesized value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRange {
  /// Scores: [0, inf)
  #[default]
  NonNegative,
  /// Rates, shares, sentiment: [0, 1]
  UnitInterval,
}

impl ValueRange {
  pub fn ceiling(self) -> f64 {
    match self {
      ValueRange::NonNegative => f64::INFINITY,
      ValueRange::UnitInterval => UNIT_CEILING,
    }
  }

  pub fn clamp(self, value: f64) -> f64 {
    value.max(UNIT_FLOOR).min(self.ceiling())
  }

  pub fn contains(self, value: f64) -> bool {
    value >= UNIT_FLOOR && value <= self.ceiling()
  }
}

/// Draw one multiplier uniformly from the bound's window
pub fn draw_multiplier<R: Rng + ?Sized>(bound: FluctuationBound, rng: &mut R) -> f64 {
  let (lo, hi) = bound.multipliers();
  if lo == hi {
    return lo;
  }
  rng.gen_range(lo..=hi)
}

/// Scale `value` by a random multiplier from `bound`
///
/// # Returns
/// The scaled value, unclamped
pub fn apply_fluctuation<R: Rng + ?Sized>(value: f64, bound: FluctuationBound, rng: &mut R) -> f64 {
  value * draw_multiplier(bound, rng)
}

/// Shift `value` by a uniform offset in [-delta, +delta]
///
/// # Returns
/// The shifted value, unclamped
pub fn apply_offset<R: Rng + ?Sized>(value: f64, delta: f64, rng: &mut R) -> f64 {
  let delta = delta.abs();
  if delta == 0.0 {
    return value;
  }
  value + rng.gen_range(-delta..=delta)
}

/// Window a perturbed value must land in before any rank repair
///
/// # Returns
/// (lower, upper) with the lower edge floored at zero
pub fn fluctuation_window(value: f64, bound: FluctuationBound) -> (f64, f64) {
  let (lo, hi) = bound.multipliers();
  let a = value * lo;
  let b = value * hi;
  // negative inputs flip the window
  (a.min(b).max(UNIT_FLOOR), a.max(b).max(UNIT_FLOOR))
}
