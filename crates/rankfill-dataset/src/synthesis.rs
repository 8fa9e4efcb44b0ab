//! Per-day synthesis
//! Builds a fresh record from a base day by running every metric of the plan in order

use std::collections::HashMap;

use rand::Rng;
use rankfill_core::invariants::{assert_same_keys, assert_strict_order_preserved, assert_within_range};
use rankfill_core::{derive_product, jitter_absolute, jitter_relative, PerturbError, RankPreservingPerturber, ScoreSet};
use tracing::{debug, warn};

use crate::error::{DatasetError, Result};
use crate::model::DayRecord;
use crate::plan::{FieldPolicy, SynthesisPlan};

fn perturb_err(metric: &str) -> impl FnOnce(PerturbError) -> DatasetError + '_ {
  move |source| DatasetError::Perturb { metric: metric.to_string(), source }
}

/// Synthesize one day from `base`
///
/// # Arguments
/// * `base` - Known day the values are perturbed from, left untouched
/// * `plan` - Metrics to synthesize, in dependency order
/// * `rng` - Random source shared across the whole run
///
/// # Returns
/// A new record. Metrics the plan does not name and metrics missing from
/// the source channel are carried over unchanged.
pub fn synthesize_day<R: Rng + ?Sized>(base: &DayRecord, plan: &SynthesisPlan, rng: &mut R) -> Result<DayRecord> {
  let source = plan.source_channel.as_str();
  let mut record = base.clone();
  let mut synthesized: HashMap<&str, ScoreSet> = HashMap::new();
  let empty = ScoreSet::new();

  for entry in &plan.metrics {
    let metric = entry.metric.as_str();
    let original = match base.score_set(source, metric)? {
      Some(original) => original,
      None => {
        debug!(metric, "metric absent from base record, skipped");
        continue;
      }
    };

    let values = match &entry.policy {
      FieldPolicy::RankPreserving { bound, range } => {
        let values = RankPreservingPerturber::new(*range)
          .perturb(&original, *bound, rng)
          .map_err(perturb_err(metric))?;
        assert_strict_order_preserved(&original, &values).map_err(perturb_err(metric))?;
        values
      }
      FieldPolicy::Jitter { bound, range } => {
        jitter_relative(&original, *bound, *range, rng).map_err(perturb_err(metric))?
      }
      FieldPolicy::AdditiveJitter { delta, range } => {
        jitter_absolute(&original, *delta, *range, rng).map_err(perturb_err(metric))?
      }
      FieldPolicy::DerivedProduct { left, right, fallback, range } => {
        let lhs = synthesized.get(left.as_str()).unwrap_or(&empty);
        let rhs = synthesized.get(right.as_str()).unwrap_or(&empty);
        let derived = derive_product(&original, lhs, rhs, *fallback, *range, rng).map_err(perturb_err(metric))?;
        if !derived.fallbacks.is_empty() {
          warn!(
            metric,
            count = derived.fallbacks.len(),
            brands = ?derived.fallbacks,
            "base values missing, jittered stale derived values instead"
          );
        }
        derived.values
      }
    };

    assert_same_keys(&original, &values).map_err(perturb_err(metric))?;
    assert_within_range(&values, entry.policy.range()).map_err(perturb_err(metric))?;

    record.set_score_set(source, metric, &values)?;
    for mirror in &plan.mirror_channels {
      if record.has_metric(mirror, metric) {
        record.set_score_set(mirror, metric, &values)?;
      }
    }

    synthesized.insert(metric, values);
  }

  Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CHATGPT_CHANNEL, COMBINED_SCORE, CONTENT_SHARE, MENTION_RATE, OVERALL_CHANNEL, TOTAL_SCORE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn base_record() -> DayRecord {
        serde_json::from_value(json!({
            "overall": {
                "mention_rate": { "HPE": 0.8, "华为": 0.6, "Dell": 0.3 },
                "content_share": { "HPE": 0.4, "华为": 0.35, "Dell": 0.25 },
                "brand_domains": { "HPE": ["hpe.com"] },
                "combined_score": { "HPE": 0.32, "华为": 0.21, "Dell": 0.075, "Ghost": 0.01 },
                "sentiment_score": { "HPE": 0.7, "华为": 0.98, "Dell": 0.02 },
                "total_score": { "HPE": 80.0, "华为": 79.5, "Dell": 20.0 },
                "absolute_rank": { "HPE": 1, "华为": 2, "Dell": 3 }
            },
            "chatgpt": {
                "mention_rate": { "HPE": 0.8, "华为": 0.6, "Dell": 0.3 },
                "brand_domains": { "HPE": ["hpe.com"] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_base_record_is_not_mutated() {
        let base = base_record();
        let before = base.clone();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let _ = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(base, before);
    }

    #[test]
    fn test_pass_through_fields_untouched() {
        let base = base_record();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let day = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(42)).unwrap();

        let overall = day.channel(OVERALL_CHANNEL).unwrap();
        assert_eq!(overall["brand_domains"], json!({ "HPE": ["hpe.com"] }));
        assert_eq!(overall["absolute_rank"], json!({ "HPE": 1, "华为": 2, "Dell": 3 }));
    }

    #[test]
    fn test_mirror_only_where_metric_exists() {
        let base = base_record();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let day = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(42)).unwrap();

        let overall_rates = day.score_set(OVERALL_CHANNEL, MENTION_RATE).unwrap().unwrap();
        let mirrored_rates = day.score_set(CHATGPT_CHANNEL, MENTION_RATE).unwrap().unwrap();
        assert_eq!(overall_rates, mirrored_rates);
        assert!(!day.has_metric(CHATGPT_CHANNEL, TOTAL_SCORE));
        assert!(!day.has_metric(CHATGPT_CHANNEL, CONTENT_SHARE));
    }

    #[test]
    fn test_ranked_metrics_keep_order() {
        let base = base_record();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        for seed in 0..100 {
            let day = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(seed)).unwrap();
            let total = day.score_set(OVERALL_CHANNEL, TOTAL_SCORE).unwrap().unwrap();
            assert_eq!(total.rank_order(), vec!["HPE", "华为", "Dell"]);
            let rates = day.score_set(OVERALL_CHANNEL, MENTION_RATE).unwrap().unwrap();
            assert_eq!(rates.rank_order(), vec!["HPE", "华为", "Dell"]);
            assert!(rates.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn test_combined_is_product_of_synthesized_bases() {
        let base = base_record();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let day = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(7)).unwrap();

        let rates = day.score_set(OVERALL_CHANNEL, MENTION_RATE).unwrap().unwrap();
        let shares = day.score_set(OVERALL_CHANNEL, CONTENT_SHARE).unwrap().unwrap();
        let combined = day.score_set(OVERALL_CHANNEL, COMBINED_SCORE).unwrap().unwrap();

        for brand in ["HPE", "华为", "Dell"] {
            let expected = rates.get(brand).unwrap() * shares.get(brand).unwrap();
            assert!((combined.get(brand).unwrap() - expected).abs() < 1e-12);
        }
        // Ghost has no bases and is jittered from its stale value
        let ghost = combined.get("Ghost").unwrap();
        assert!((0.0094..=0.0106).contains(&ghost));
    }

    #[test]
    fn test_missing_metrics_are_skipped() {
        let base: DayRecord = serde_json::from_value(json!({
            "overall": { "total_score": { "a": 2.0, "b": 1.0 } }
        }))
        .unwrap();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let day = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(1)).unwrap();
        let overall = day.channel(OVERALL_CHANNEL).unwrap();
        assert_eq!(overall.len(), 1);
        assert!(overall.contains_key(TOTAL_SCORE));
    }

    #[test]
    fn test_empty_base_record() {
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let day = synthesize_day(&DayRecord::new(), &plan, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(day, DayRecord::new());
    }

    #[test]
    fn test_non_numeric_metric_is_an_error() {
        let base: DayRecord = serde_json::from_value(json!({
            "overall": { "total_score": { "a": "high" } }
        }))
        .unwrap();
        let plan = SynthesisPlan::brand_ranking().unwrap();
        let err = synthesize_day(&base, &plan, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedMetric { .. }));
    }
}
