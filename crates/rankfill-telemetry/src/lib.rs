//! Tracing setup shared by the rankfill binaries

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins when set, otherwise `default_filter` (e.g. "info",
/// "rankfill_dataset=debug") is used.
pub fn init(default_filter: &str) -> Result<()> {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(default_filter)
      .map_err(|e| anyhow!("invalid log filter '{}': {}", default_filter, e))?,
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .try_init()
    .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
