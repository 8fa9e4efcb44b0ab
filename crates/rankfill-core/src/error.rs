use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PerturbError {
  #[error("invalid fluctuation bound: min_percent {min} must not exceed max_percent {max}")]
  InvalidBound { min: f64, max: f64 },

  #[error("invalid fluctuation bound: {which} is not a finite number")]
  NonFiniteBound { which: &'static str },

  #[error("invalid additive delta {delta}: must be finite and non-negative")]
  InvalidDelta { delta: f64 },

  #[error("invalid value for '{id}': {value} is not a finite number")]
  InvalidValue { id: String, value: f64 },

  #[error("rank inversion: '{higher}' ranked above '{lower}' but no longer is")]
  RankInversion { higher: String, lower: String },

  #[error("identifier set changed: '{id}' is missing from one side")]
  KeySetMismatch { id: String },

  #[error("value for '{id}' is out of range: {value}")]
  OutOfRange { id: String, value: f64 },
}

pub type Result<T> = std::result::Result<T, PerturbError>;
