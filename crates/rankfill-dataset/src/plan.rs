//! Synthesis plan - which metric gets which perturbation
//! Order matters: a derived metric reads the already synthesized values of its bases

use std::collections::HashSet;

use rankfill_core::constants::{
  COMBINED_SCORE_SWING, CONTENT_SHARE_SWING, MENTION_RATE_SWING, SENTIMENT_DELTA, TOTAL_SCORE_SWING,
};
use rankfill_core::{FluctuationBound, ValueRange};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::model::{
  CHATGPT_CHANNEL, COMBINED_SCORE, CONTENT_SHARE, MENTION_RATE, OVERALL_CHANNEL, SENTIMENT_SCORE,
  TOTAL_SCORE,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FieldPolicy {
  /// Relative swing, strict rank order kept
  RankPreserving {
    bound: FluctuationBound,
    #[serde(default)]
    range: ValueRange,
  },
  /// Relative swing per entity, no ordering
  Jitter {
    bound: FluctuationBound,
    #[serde(default)]
    range: ValueRange,
  },
  /// Absolute +/- delta per entity, no ordering
  AdditiveJitter {
    delta: f64,
    #[serde(default)]
    range: ValueRange,
  },
  /// left[k] * right[k] over the synthesized bases
  DerivedProduct {
    left: String,
    right: String,
    fallback: FluctuationBound,
    #[serde(default)]
    range: ValueRange,
  },
}

impl FieldPolicy {
  pub fn range(&self) -> ValueRange {
    match self {
      FieldPolicy::RankPreserving { range, .. }
      | FieldPolicy::Jitter { range, .. }
      | FieldPolicy::AdditiveJitter { range, .. }
      | FieldPolicy::DerivedProduct { range, .. } => *range,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPlan {
  pub metric: String,
  #[serde(flatten)]
  pub policy: FieldPolicy,
}

impl MetricPlan {
  pub fn new(metric: impl Into<String>, policy: FieldPolicy) -> Self {
    Self { metric: metric.into(), policy }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisPlan {
  /// Channel the metrics are read from and synthesized into
  #[serde(default = "default_source_channel")]
  pub source_channel: String,
  /// Channels that receive a copy of each synthesized metric they already carry
  #[serde(default = "default_mirror_channels")]
  pub mirror_channels: Vec<String>,
  pub metrics: Vec<MetricPlan>,
}

fn default_source_channel() -> String {
  OVERALL_CHANNEL.to_string()
}

fn default_mirror_channels() -> Vec<String> {
  vec![CHATGPT_CHANNEL.to_string()]
}

fn swing(percent: f64) -> Result<FluctuationBound> {
  FluctuationBound::symmetric(percent).map_err(|e| DatasetError::InvalidPlan(e.to_string()))
}

impl SynthesisPlan {
  /// Plan used for the brand-ranking dataset
  ///
  /// mention_rate and total_score keep their ranking, content_share and
  /// sentiment_score move freely, combined_score follows its two bases.
  pub fn brand_ranking() -> Result<Self> {
    Ok(Self {
      source_channel: default_source_channel(),
      mirror_channels: default_mirror_channels(),
      metrics: vec![
        MetricPlan::new(
          MENTION_RATE,
          FieldPolicy::RankPreserving { bound: swing(MENTION_RATE_SWING)?, range: ValueRange::UnitInterval },
        ),
        MetricPlan::new(
          CONTENT_SHARE,
          FieldPolicy::Jitter { bound: swing(CONTENT_SHARE_SWING)?, range: ValueRange::UnitInterval },
        ),
        MetricPlan::new(
          COMBINED_SCORE,
          FieldPolicy::DerivedProduct {
            left: MENTION_RATE.to_string(),
            right: CONTENT_SHARE.to_string(),
            fallback: swing(COMBINED_SCORE_SWING)?,
            range: ValueRange::NonNegative,
          },
        ),
        MetricPlan::new(
          SENTIMENT_SCORE,
          FieldPolicy::AdditiveJitter { delta: SENTIMENT_DELTA, range: ValueRange::UnitInterval },
        ),
        MetricPlan::new(
          TOTAL_SCORE,
          FieldPolicy::RankPreserving { bound: swing(TOTAL_SCORE_SWING)?, range: ValueRange::NonNegative },
        ),
      ],
    })
  }

  pub fn from_json_str(raw: &str) -> Result<Self> {
    let plan: Self = serde_json::from_str(raw).map_err(|e| DatasetError::InvalidPlan(e.to_string()))?;
    plan.validate()?;
    Ok(plan)
  }

  /// Check metric names are unique and every derived metric comes after its bases
  pub fn validate(&self) -> Result<()> {
    if self.mirror_channels.iter().any(|c| c == &self.source_channel) {
      return Err(DatasetError::InvalidPlan(format!(
        "source channel '{}' cannot also be a mirror",
        self.source_channel
      )));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &self.metrics {
      match &entry.policy {
        FieldPolicy::DerivedProduct { left, right, .. } => {
          for base in [left, right] {
            if !seen.contains(base.as_str()) {
              return Err(DatasetError::InvalidPlan(format!(
                "derived metric '{}' needs '{}' synthesized before it",
                entry.metric, base
              )));
            }
          }
        }
        FieldPolicy::AdditiveJitter { delta, .. } if !delta.is_finite() || *delta < 0.0 => {
          return Err(DatasetError::InvalidPlan(format!(
            "metric '{}' has invalid delta {}",
            entry.metric, delta
          )));
        }
        _ => {}
      }

      if !seen.insert(entry.metric.as_str()) {
        return Err(DatasetError::InvalidPlan(format!("metric '{}' listed twice", entry.metric)));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_ranking_plan_is_valid() {
        let plan = SynthesisPlan::brand_ranking().unwrap();
        plan.validate().unwrap();
        assert_eq!(plan.source_channel, "overall");
        assert_eq!(plan.mirror_channels, vec!["chatgpt".to_string()]);
        assert_eq!(plan.metrics.len(), 5);
        assert_eq!(plan.metrics[0].policy.range(), ValueRange::UnitInterval);
    }

    #[test]
    fn test_derived_before_base_rejected() {
        let raw = r#"{
            "metrics": [
                { "metric": "combined_score", "policy": "derived_product",
                  "left": "mention_rate", "right": "content_share", "fallback": [-0.05, 0.05] },
                { "metric": "mention_rate", "policy": "jitter", "bound": [-0.1, 0.1] },
                { "metric": "content_share", "policy": "jitter", "bound": [-0.05, 0.05] }
            ]
        }"#;
        let err = SynthesisPlan::from_json_str(raw).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidPlan(ref msg) if msg.contains("combined_score")));
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let raw = r#"{
            "metrics": [
                { "metric": "total_score", "policy": "rank_preserving", "bound": [-0.1, 0.1] },
                { "metric": "total_score", "policy": "jitter", "bound": [-0.1, 0.1] }
            ]
        }"#;
        assert!(SynthesisPlan::from_json_str(raw).is_err());
    }

    #[test]
    fn test_inverted_bound_rejected() {
        let raw = r#"{
            "metrics": [
                { "metric": "total_score", "policy": "rank_preserving", "bound": [0.1, -0.1] }
            ]
        }"#;
        assert!(SynthesisPlan::from_json_str(raw).is_err());
    }

    #[test]
    fn test_plan_from_json_uses_defaults() {
        let raw = r#"{
            "metrics": [
                { "metric": "sentiment_score", "policy": "additive_jitter", "delta": 0.02, "range": "unit_interval" }
            ]
        }"#;
        let plan = SynthesisPlan::from_json_str(raw).unwrap();
        assert_eq!(plan.source_channel, "overall");
        assert_eq!(
            plan.metrics[0].policy,
            FieldPolicy::AdditiveJitter { delta: 0.02, range: ValueRange::UnitInterval }
        );
    }

    #[test]
    fn test_mirror_equal_to_source_rejected() {
        let mut plan = SynthesisPlan::brand_ranking().unwrap();
        plan.mirror_channels.push("overall".to_string());
        assert!(plan.validate().is_err());
    }
}
