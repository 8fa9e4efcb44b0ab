//! Perturbation-wide constants
//! Centralized location for the default fluctuation windows

// RANK REPAIR
pub const RANK_EPSILON: f64 = 1e-4;             // minimum gap between strictly ranked entities

// VALUE RANGES
pub const UNIT_FLOOR: f64 = 0.0;
pub const UNIT_CEILING: f64 = 1.0;              // rates and shares are fractions

// DEFAULT FLUCTUATION WINDOWS
pub const MENTION_RATE_SWING: f64 = 0.10;       // +/-10%
pub const CONTENT_SHARE_SWING: f64 = 0.05;      // +/-5%
pub const COMBINED_SCORE_SWING: f64 = 0.05;     // +/-5%, fallback only
pub const TOTAL_SCORE_SWING: f64 = 0.10;        // +/-10%
pub const SENTIMENT_DELTA: f64 = 0.05;          // absolute, not relative
