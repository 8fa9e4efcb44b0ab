//! Rank-preserving value perturbation for brand-ranking metrics
//! Pure functions of their inputs plus an explicit random source

pub mod constants;
pub mod error;
pub mod invariants;
pub mod jitter;
pub mod math;
pub mod perturb;
pub mod score_set;

pub use error::{PerturbError, Result};
pub use jitter::{derive_product, jitter_absolute, jitter_relative, DerivedProduct};
pub use math::{FluctuationBound, ValueRange};
pub use perturb::{perturb, RankPreservingPerturber, RankedCandidate};
pub use score_set::ScoreSet;
