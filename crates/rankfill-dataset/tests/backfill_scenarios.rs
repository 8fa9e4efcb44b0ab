use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use rankfill_core::invariants::assert_strict_order_preserved;
use rankfill_dataset::model::{
    CHATGPT_CHANNEL, COMBINED_SCORE, CONTENT_SHARE, MENTION_RATE, OVERALL_CHANNEL, SENTIMENT_SCORE, TOTAL_SCORE,
};
use rankfill_dataset::{
    backfill_dataset, date_range, inspect_product, load_dataset, save_dataset, default_groups, BackfillRequest,
    Dataset, SynthesisPlan,
};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn overall() -> serde_json::Value {
    json!({
        "mention_rate": { "HPE": 0.82, "华为": 0.81, "Dell": 0.4, "Lenovo": 0.4, "浪潮": 0.05 },
        "content_share": { "HPE": 0.3, "华为": 0.28, "Dell": 0.2, "Lenovo": 0.15, "浪潮": 0.07 },
        "brand_domains": { "HPE": ["hpe.com"], "华为": ["huawei.com"] },
        "combined_score": { "HPE": 0.246, "华为": 0.2268, "Dell": 0.08, "Lenovo": 0.06, "浪潮": 0.0035 },
        "sentiment_score": { "HPE": 0.66, "华为": 0.71, "Dell": 0.5, "Lenovo": 0.97, "浪潮": 0.03 },
        "total_score": { "HPE": 61.2, "华为": 61.1, "Dell": 38.0, "Lenovo": 35.5, "浪潮": 4.0 },
        "absolute_rank": { "HPE": 1, "华为": 2, "Dell": 3, "Lenovo": 4, "浪潮": 5 },
        "aggregated_sentiment_detail": { "HPE": { "positive": 12, "negative": 1 } }
    })
}

fn dataset() -> Dataset {
    serde_json::from_value(json!({
        "英业达 (Inventec) 机架解决方案": [
            ["2025-11-06", {
                "overall": overall(),
                "chatgpt": {
                    "mention_rate": overall()["mention_rate"].clone(),
                    "total_score": overall()["total_score"].clone()
                }
            }]
        ],
        "Edge servers": [
            ["2025-11-04", { "overall": overall() }]
        ],
        "Unlaunched": []
    }))
    .unwrap()
}

fn request() -> BackfillRequest {
    BackfillRequest {
        base_date: day(11, 6),
        dates: date_range(day(10, 31), day(11, 5)),
        plan: SynthesisPlan::brand_ranking().unwrap(),
    }
}

#[test]
fn scenario_full_backfill_summary() {
    let input = dataset();
    let (out, summary) = backfill_dataset(&input, &request(), &mut StdRng::seed_from_u64(42)).unwrap();

    assert_eq!(summary.products, 3);
    assert_eq!(summary.skipped, vec!["Unlaunched".to_string()]);
    assert_eq!(summary.base_fallbacks, vec!["Edge servers".to_string()]);
    // 6 days for the first product, 5 for the second (its base day is 11-04)
    assert_eq!(summary.days_generated, 11);

    assert_eq!(out.names().collect::<Vec<_>>(), input.names().collect::<Vec<_>>());
    assert_eq!(out.product("Unlaunched").unwrap().timeline.len(), 0);

    let main = out.product("英业达 (Inventec) 机架解决方案").unwrap();
    let dates: Vec<NaiveDate> = main.timeline.iter().map(|e| e.date()).collect();
    assert_eq!(dates, date_range(day(10, 31), day(11, 6)));
    // base day untouched
    assert_eq!(main.timeline.last().unwrap(), &input.product("英业达 (Inventec) 机架解决方案").unwrap().timeline[0]);
}

#[test]
fn scenario_every_synthesized_day_keeps_rankings() {
    let input = dataset();
    let base = input.product("英业达 (Inventec) 机架解决方案").unwrap().timeline[0].record().clone();
    let (out, _) = backfill_dataset(&input, &request(), &mut StdRng::seed_from_u64(7)).unwrap();

    for entry in &out.product("英业达 (Inventec) 机架解决方案").unwrap().timeline {
        let record = entry.record();
        for metric in [MENTION_RATE, TOTAL_SCORE] {
            let before = base.score_set(OVERALL_CHANNEL, metric).unwrap().unwrap();
            let after = record.score_set(OVERALL_CHANNEL, metric).unwrap().unwrap();
            assert_strict_order_preserved(&before, &after).unwrap();
            // HPE/华为 are close but strictly ordered
            assert!(after.get("HPE").unwrap() > after.get("华为").unwrap());
        }

        for metric in [MENTION_RATE, CONTENT_SHARE, SENTIMENT_SCORE] {
            let values = record.score_set(OVERALL_CHANNEL, metric).unwrap().unwrap();
            assert!(values.iter().all(|(_, v)| (0.0..=1.0).contains(&v)), "{} out of range", metric);
        }

        let rates = record.score_set(OVERALL_CHANNEL, MENTION_RATE).unwrap().unwrap();
        let shares = record.score_set(OVERALL_CHANNEL, CONTENT_SHARE).unwrap().unwrap();
        let combined = record.score_set(OVERALL_CHANNEL, COMBINED_SCORE).unwrap().unwrap();
        for (brand, value) in combined.iter() {
            let expected = rates.get(brand).unwrap() * shares.get(brand).unwrap();
            assert!((value - expected).abs() < 1e-12);
        }

        // chatgpt mirrors what it carried, nothing more
        assert_eq!(
            record.score_set(CHATGPT_CHANNEL, TOTAL_SCORE).unwrap().unwrap(),
            record.score_set(OVERALL_CHANNEL, TOTAL_SCORE).unwrap().unwrap()
        );
        assert!(!record.has_metric(CHATGPT_CHANNEL, COMBINED_SCORE));

        let channel = record.channel(OVERALL_CHANNEL).unwrap();
        assert_eq!(channel["absolute_rank"], overall()["absolute_rank"]);
        assert_eq!(channel["aggregated_sentiment_detail"], overall()["aggregated_sentiment_detail"]);
    }
}

#[test]
fn scenario_same_seed_same_dataset() {
    let input = dataset();
    let (a, _) = backfill_dataset(&input, &request(), &mut StdRng::seed_from_u64(42)).unwrap();
    let (b, _) = backfill_dataset(&input, &request(), &mut StdRng::seed_from_u64(42)).unwrap();
    let (c, _) = backfill_dataset(&input, &request(), &mut StdRng::seed_from_u64(43)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn scenario_save_load_and_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all_brands_results.json");

    let (out, _) = backfill_dataset(&dataset(), &request(), &mut StdRng::seed_from_u64(42)).unwrap();
    save_dataset(&path, &out).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("英业达"), "non-ASCII text must not be escaped");
    assert!(raw.starts_with("{\n  \""));

    let loaded = load_dataset(&path).unwrap();
    assert_eq!(loaded, out);

    let report = inspect_product(&loaded, "英业达 (Inventec) 机架解决方案", &default_groups(), 10).unwrap();
    assert_eq!(report.date, day(10, 31));
    assert_eq!(report.leading_brands.len(), 5);
    assert_eq!(report.groups[0].matches, vec!["HPE".to_string()]);
    assert_eq!(report.groups[1].matches, vec!["华为".to_string()]);
    assert!(report.groups[1].total_score.is_some());
}
