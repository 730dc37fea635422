//! End-to-end runs of the cross-validation loop with scripted models

use essay_cv_core::cv::{CrossValidation, EpochObserver, FinalReport};
use essay_cv_core::data::{FeatureBatch, FoldData, FoldSource};
use essay_cv_core::error::{EssayCvError, Result};
use essay_cv_core::evaluator::BestMetrics;
use essay_cv_core::metrics::{EpochMetrics, MetricEngine, Statistic};
use essay_cv_core::model::{ModelShape, ScoringModel};
use essay_cv_core::rubric::{PromptRubric, RubricSchema, ScoreRange, MISSING_SCORE};

fn slots(score: i64, content: i64, conventions: i64) -> Vec<i64> {
    // score, content, organization, word_choice, sentence_fluency, conventions, ...
    let mut raw = vec![MISSING_SCORE; 9];
    raw[0] = score;
    raw[1] = content;
    raw[5] = conventions;
    raw
}

fn features(rows: usize) -> FeatureBatch {
    FeatureBatch {
        tokens: vec![vec![2; 6]; rows],
        linguistic: vec![vec![1.0; 3]; rows],
        readability: vec![vec![0.5; 2]; rows],
    }
}

struct ScriptedFolds {
    test_scores: Vec<Vec<Vec<i64>>>,
}

impl FoldSource for ScriptedFolds {
    fn load_fold(&mut self, fold: usize) -> Result<FoldData> {
        let test_scores = self
            .test_scores
            .get(fold)
            .cloned()
            .ok_or_else(|| EssayCvError::invalid_data(format!("fold {} not scripted", fold)))?;
        let train_scores = vec![slots(6, 3, 3), slots(9, 5, 4)];
        Ok(FoldData {
            train: features(train_scores.len()),
            test: features(test_scores.len()),
            train_prompts: vec![1; train_scores.len()],
            test_prompts: vec![1; test_scores.len()],
            train_scores,
            test_scores,
            vocab_len: 10,
            max_sentnum: 2,
            max_sentlen: 3,
        })
    }
}

/// Replays one normalized prediction matrix per epoch
struct Replay {
    epochs: Vec<Vec<Vec<f64>>>,
    trained: usize,
}

impl ScoringModel for Replay {
    fn train_one_epoch(&mut self, _: &FeatureBatch, _: &[Vec<f64>]) -> Result<()> {
        self.trained += 1;
        Ok(())
    }

    fn predict(&self, _: &FeatureBatch) -> Result<Vec<Vec<f64>>> {
        Ok(self.epochs[self.trained - 1].clone())
    }
}

fn normalize(rows: &[Vec<i64>], ranges: &[ScoreRange]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .zip(ranges)
                .map(|(&v, r)| (v - r.min) as f64 / r.span() as f64)
                .collect()
        })
        .collect()
}

fn schema() -> RubricSchema {
    RubricSchema::from_prompts(vec![PromptRubric::new(
        1,
        (2, 12),
        (1, 6),
        &["content", "conventions"],
    )])
    .unwrap()
}

const RANGES: [ScoreRange; 3] = [
    ScoreRange { min: 2, max: 12 },
    ScoreRange { min: 1, max: 6 },
    ScoreRange { min: 1, max: 6 },
];

#[derive(Default)]
struct BestTrail(Vec<(usize, usize, Option<usize>)>);

impl EpochObserver for BestTrail {
    fn on_epoch(&mut self, fold: usize, epoch: usize, _: &EpochMetrics, best: &BestMetrics) {
        self.0.push((fold, epoch, best.epoch));
    }
}

#[test]
fn test_two_folds_perfect_at_different_epochs() {
    let schema = schema();
    let fold_truth = vec![
        vec![vec![2, 1, 6], vec![7, 3, 4], vec![12, 6, 1], vec![10, 5, 2]],
        vec![vec![4, 2, 2], vec![8, 4, 5], vec![11, 6, 6], vec![3, 1, 1]],
    ];
    let imperfect = |truth: &[Vec<i64>]| -> Vec<Vec<i64>> {
        // reversed rows: same marginals, wrong essays
        truth.iter().rev().cloned().collect()
    };

    // fold 0 is exact at epoch index 1, fold 1 at epoch index 2
    let perfect_epoch = [1, 2];
    let mut source = ScriptedFolds {
        test_scores: fold_truth
            .iter()
            .map(|rows| rows.iter().map(|r| slots(r[0], r[1], r[2])).collect())
            .collect(),
    };
    let mut factory = |shape: &ModelShape, fold: usize| -> Result<Replay> {
        assert_eq!(shape.outputs, 3);
        let truth = &fold_truth[fold];
        let epochs = (0..3)
            .map(|epoch| {
                if epoch == perfect_epoch[fold] {
                    normalize(truth, &RANGES)
                } else {
                    normalize(&imperfect(truth), &RANGES)
                }
            })
            .collect();
        Ok(Replay { epochs, trained: 0 })
    };
    let mut trail = BestTrail::default();

    let report = CrossValidation::new(&schema, 1, 2, 3)
        .unwrap()
        .run_observed(&mut source, &mut factory, &mut trail)
        .unwrap();

    assert_eq!(report.qwk, vec![1.0, 1.0, 1.0]);
    assert_eq!(report.lwk, vec![1.0, 1.0, 1.0]);
    assert_eq!(report.rmse, vec![0.0, 0.0, 0.0]);
    assert_eq!(report.mae, vec![0.0, 0.0, 0.0]);
    assert_eq!(report.mean_of(Statistic::Qwk), 1.0);

    // the perfect epoch stays best once reached
    assert_eq!(trail.0[2], (0, 2, Some(1)));
    assert_eq!(trail.0[5], (1, 2, Some(2)));
}

#[test]
fn test_three_fold_report_is_mean_of_fold_bests() {
    let schema = RubricSchema::from_prompts(vec![PromptRubric::new(1, (2, 12), (1, 6), &[])]).unwrap();
    let truth = vec![vec![2], vec![12], vec![7], vec![5]];
    let fold_predictions = vec![
        vec![vec![2], vec![12], vec![7], vec![5]],
        vec![vec![2], vec![12], vec![8], vec![5]],
        vec![vec![3], vec![11], vec![7], vec![5]],
    ];
    let overall = [RANGES[0]];

    let mut source = ScriptedFolds {
        test_scores: vec![
            truth
                .iter()
                .map(|r| slots(r[0], MISSING_SCORE, MISSING_SCORE))
                .collect();
            3
        ],
    };
    let mut factory = |_: &ModelShape, fold: usize| -> Result<Replay> {
        Ok(Replay {
            epochs: vec![normalize(&fold_predictions[fold], &overall)],
            trained: 0,
        })
    };

    let report: FinalReport = CrossValidation::new(&schema, 1, 3, 1)
        .unwrap()
        .run(&mut source, &mut factory)
        .unwrap();

    let column = |rows: &[Vec<i64>]| rows.iter().map(|r| r[0]).collect::<Vec<_>>();
    let per_fold: Vec<_> = fold_predictions
        .iter()
        .map(|pred| MetricEngine::evaluate_item(&column(&truth), &column(pred), overall[0]).unwrap())
        .collect();
    let expected_qwk = per_fold.iter().map(|m| m.qwk).sum::<f64>() / 3.0;

    assert_eq!(report.item_names, vec!["score"]);
    assert!((report.qwk[0] - expected_qwk).abs() < 1e-12);
    // fold errors: 0, one essay off by 1, two essays off by 1 (n = 4)
    assert!((report.mae[0] - (0.0 + 0.25 + 0.5) / 3.0).abs() < 1e-12);
    let expected_rmse = (0.0 + 0.25_f64.sqrt() + 0.5_f64.sqrt()) / 3.0;
    assert!((report.rmse[0] - expected_rmse).abs() < 1e-12);
}
