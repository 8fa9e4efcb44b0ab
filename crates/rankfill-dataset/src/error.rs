use std::path::PathBuf;

use chrono::NaiveDate;
use rankfill_core::PerturbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
  #[error("failed to access {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse JSON in {path}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("channel '{channel}' is not a JSON object")]
  MalformedChannel { channel: String },

  #[error("metric '{channel}.{metric}' is malformed: {reason}")]
  MalformedMetric {
    channel: String,
    metric: String,
    reason: String,
  },

  #[error("failed to synthesize metric '{metric}'")]
  Perturb {
    metric: String,
    #[source]
    source: PerturbError,
  },

  #[error("invalid synthesis plan: {0}")]
  InvalidPlan(String),

  #[error("invalid brand group '{raw}': {reason}")]
  InvalidBrandGroup { raw: String, reason: String },

  #[error("unknown product '{0}'")]
  UnknownProduct(String),

  #[error("product '{0}' has no timeline entries")]
  EmptyTimeline(String),

  #[error("failed to synthesize {date} for product '{product}'")]
  Synthesis {
    product: String,
    date: NaiveDate,
    #[source]
    source: Box<DatasetError>,
  },
}

pub type Result<T> = std::result::Result<T, DatasetError>;
