//! Runtime configuration for the rankfill binaries
//! Values come from the process environment, optionally seeded from a `.env` file

use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_INPUT: &str = "RANKFILL_INPUT";
pub const ENV_OUTPUT: &str = "RANKFILL_OUTPUT";
pub const ENV_BASE_DATE: &str = "RANKFILL_BASE_DATE";
pub const ENV_START_DATE: &str = "RANKFILL_START_DATE";
pub const ENV_END_DATE: &str = "RANKFILL_END_DATE";
pub const ENV_SEED: &str = "RANKFILL_SEED";
pub const ENV_PLAN: &str = "RANKFILL_PLAN";
pub const ENV_LOG: &str = "RANKFILL_LOG";

pub const DEFAULT_BASE_DATE: &str = "2025-11-06";
pub const DEFAULT_START_DATE: &str = "2025-10-31";
pub const DEFAULT_END_DATE: &str = "2025-11-05";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_LOG: &str = "info";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("missing required setting {0}")]
  Missing(&'static str),

  #[error("invalid value for {key}: '{value}' ({reason})")]
  Invalid {
    key: &'static str,
    value: String,
    reason: String,
  },

  #[error("start date {start} is after end date {end}")]
  EmptyDateRange { start: NaiveDate, end: NaiveDate },

  #[error("failed to load .env: {0}")]
  DotEnv(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  pub input: Option<PathBuf>,
  pub output: Option<PathBuf>,
  pub base_date: NaiveDate,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub seed: u64,
  pub plan: Option<PathBuf>,
  pub log: String,
}

impl Config {
  /// Load `.env` (if present) and read a validated configuration from the environment
  pub fn from_env() -> Result<Self, ConfigError> {
    let config = Self::load_env()?;
    config.validate()?;
    Ok(config)
  }

  /// Load `.env` (if present) and read the environment without validating
  /// For callers that apply overrides first; they must call `validate` after.
  pub fn load_env() -> Result<Self, ConfigError> {
    load_dotenv(dotenvy::dotenv())?;
    Self::read_lookup(|key| env::var(key).ok())
  }

  /// Build a validated config from an arbitrary key lookup
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let config = Self::read_lookup(lookup)?;
    config.validate()?;
    Ok(config)
  }

  /// Build a config from an arbitrary key lookup, parsing but not validating it
  /// Empty values count as unset.
  pub fn read_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    Ok(Self {
      input: get(ENV_INPUT).map(PathBuf::from),
      output: get(ENV_OUTPUT).map(PathBuf::from),
      base_date: parse_date(ENV_BASE_DATE, get(ENV_BASE_DATE).as_deref().unwrap_or(DEFAULT_BASE_DATE))?,
      start_date: parse_date(ENV_START_DATE, get(ENV_START_DATE).as_deref().unwrap_or(DEFAULT_START_DATE))?,
      end_date: parse_date(ENV_END_DATE, get(ENV_END_DATE).as_deref().unwrap_or(DEFAULT_END_DATE))?,
      seed: match get(ENV_SEED) {
        Some(raw) => parse_seed(ENV_SEED, &raw)?,
        None => DEFAULT_SEED,
      },
      plan: get(ENV_PLAN).map(PathBuf::from),
      log: get(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG.to_string()),
    })
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.start_date > self.end_date {
      return Err(ConfigError::EmptyDateRange { start: self.start_date, end: self.end_date });
    }
    Ok(())
  }

  pub fn require_input(&self) -> Result<&PathBuf, ConfigError> {
    self.input.as_ref().ok_or(ConfigError::Missing(ENV_INPUT))
  }

  /// Output path, falling back to rewriting the input in place
  pub fn output_or_input(&self) -> Result<&PathBuf, ConfigError> {
    match &self.output {
      Some(path) => Ok(path),
      None => self.require_input(),
    }
  }
}

/// A missing `.env` is fine, an unreadable or malformed one is not
fn load_dotenv<T>(outcome: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
  match outcome {
    Ok(_) => Ok(()),
    Err(e) if e.not_found() => Ok(()),
    Err(e) => Err(ConfigError::DotEnv(e.to_string())),
  }
}

pub fn parse_date(key: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
  NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| ConfigError::Invalid {
    key,
    value: raw.to_string(),
    reason: e.to_string(),
  })
}

pub fn parse_seed(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
  raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
    key,
    value: raw.to_string(),
    reason: e.to_string(),
  })
}
