//! Properties of the rubric, scaler, metrics and best-epoch tracking

use essay_cv_core::evaluator::BestMetrics;
use essay_cv_core::metrics::{EpochMetrics, ItemMetrics, MetricEngine};
use essay_cv_core::rubric::{AttributeSelector, RubricSchema, ScoreRange, OVERALL_ITEM};
use essay_cv_core::scaling::ScoreScaler;
use proptest::prelude::*;

#[test]
fn test_round_trip_every_grid_point() {
    let schema = RubricSchema::asap();
    let scaler = ScoreScaler::new(&schema);

    for prompt in schema.prompt_ids() {
        for item in 0..schema.item_count(prompt).unwrap() {
            let range = schema.range_for(prompt, item).unwrap();
            for raw in range.min..=range.max {
                let normalized = scaler.scale_down(raw, item, prompt).unwrap();
                assert!((0.0..=1.0).contains(&normalized));
                assert_eq!(scaler.scale_up(normalized, item, prompt).unwrap(), raw);
            }
        }
    }
}

#[test]
fn test_mask_completeness() {
    let schema = RubricSchema::asap();
    let selector = AttributeSelector::new(&schema);

    for prompt in schema.prompt_ids() {
        let mask = selector.mask_for(prompt).unwrap();
        assert_eq!(mask.len(), schema.item_count(prompt).unwrap());
        assert_eq!(mask.positions()[OVERALL_ITEM], 0);
    }
}

#[test]
fn test_constant_sequences_have_zero_correlation() {
    let constant =
        MetricEngine::evaluate_item(&[3, 3, 3], &[3, 3, 3], ScoreRange::new(1, 6)).unwrap();
    assert_eq!(constant.corr, 0.0);
}

fn epoch_with_overall_qwk(qwk: f64) -> EpochMetrics {
    EpochMetrics {
        items: vec![
            ItemMetrics {
                qwk,
                lwk: qwk,
                corr: qwk,
                rmse: 1.0 - qwk,
                mae: 1.0 - qwk,
            },
            ItemMetrics {
                qwk: -qwk,
                lwk: 0.0,
                corr: 0.0,
                rmse: 0.0,
                mae: 0.0,
            },
        ],
    }
}

proptest! {
    #[test]
    fn test_scale_up_stays_in_range_for_any_output(value in any::<f64>()) {
        let schema = RubricSchema::asap();
        let scaler = ScoreScaler::new(&schema);

        for prompt in schema.prompt_ids() {
            for item in 0..schema.item_count(prompt).unwrap() {
                let range = schema.range_for(prompt, item).unwrap();
                let raw = scaler.scale_up(value, item, prompt).unwrap();
                prop_assert!(
                    range.contains(raw),
                    "prompt {} item {} output {} gave {}",
                    prompt,
                    item,
                    value,
                    raw
                );
            }
        }
    }

    #[test]
    fn test_best_qwk_never_decreases(observed in prop::collection::vec(-1.0f64..=1.0, 1..200)) {
        let mut best = BestMetrics::unset(2);
        let mut previous = f64::NEG_INFINITY;

        for (epoch, &qwk) in observed.iter().enumerate() {
            let candidate = epoch_with_overall_qwk(qwk);
            let improved = best.offer(&candidate, epoch);
            let overall = best.items[OVERALL_ITEM].qwk;

            prop_assert!(overall >= previous);
            prop_assert_eq!(improved, overall > previous);
            if improved {
                // every statistic of every item comes from the same epoch
                prop_assert_eq!(&best.items, &candidate.items);
                prop_assert_eq!(best.epoch, Some(epoch));
            }
            previous = overall;
        }
    }

    #[test]
    fn test_identical_non_constant_scores_agree_perfectly(
        scores in prop::collection::vec(1i64..=6, 2..60)
    ) {
        prop_assume!(scores.iter().any(|&s| s != scores[0]));

        let metrics = MetricEngine::evaluate_item(&scores, &scores, ScoreRange::new(1, 6)).unwrap();
        prop_assert_eq!(metrics.qwk, 1.0);
        prop_assert_eq!(metrics.lwk, 1.0);
        prop_assert_eq!(metrics.rmse, 0.0);
        prop_assert_eq!(metrics.mae, 0.0);
    }
}
