//! Per-fold evaluation of a model against raw ground truth
//!
//! Each epoch the model's normalized predictions are descaled onto the
//! rubric's integer ranges, scored item by item, and compared with the best
//! epoch seen so far. Selection is by the overall item's QWK, and all
//! statistics of the selected epoch are kept together.

use std::fmt;

use serde::Serialize;

use crate::data::FeatureBatch;
use crate::error::{EssayCvError, ErrorContext, Result};
use crate::format::format_stat_summary;
use crate::metrics::{EpochMetrics, ItemMetrics, MetricEngine, Statistic};
use crate::model::ScoringModel;
use crate::rubric::{RubricSchema, ScoreRange, OVERALL_ITEM};
use crate::scaling::ScoreScaler;

/// Best-so-far statistics for one fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMetrics {
    pub items: Vec<ItemMetrics>,
    /// Zero-based epoch the values come from; `None` before any evaluation
    pub epoch: Option<usize>,
}

impl BestMetrics {
    /// Sentinel state: every agreement statistic at negative infinity
    pub fn unset(num_items: usize) -> Self {
        BestMetrics {
            items: vec![
                ItemMetrics {
                    qwk: f64::NEG_INFINITY,
                    lwk: f64::NEG_INFINITY,
                    corr: f64::NEG_INFINITY,
                    rmse: f64::INFINITY,
                    mae: f64::INFINITY,
                };
                num_items
            ],
            epoch: None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.epoch.is_some()
    }

    pub fn column(&self, stat: Statistic) -> Vec<f64> {
        self.items.iter().map(|m| m.get(stat)).collect()
    }

    fn selection_score(&self) -> f64 {
        self.items
            .get(OVERALL_ITEM)
            .map_or(f64::NEG_INFINITY, |m| m.qwk)
    }

    /// Replace every item at once when the candidate's overall QWK is
    /// strictly better. Returns whether an update happened.
    pub fn offer(&mut self, candidate: &EpochMetrics, epoch: usize) -> bool {
        let score = candidate
            .overall()
            .map_or(f64::NEG_INFINITY, |m| m.qwk);
        if score > self.selection_score() {
            self.items = candidate.items.clone();
            self.epoch = Some(epoch);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for BestMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, "BEST TEST", &self.items)
    }
}

/// Result of one `evaluate_from_reg` call
#[derive(Debug, Clone, PartialEq)]
pub struct EpochOutcome {
    pub epoch: usize,
    pub metrics: EpochMetrics,
    pub improved: bool,
}

/// Stateful evaluator scoped to one fold's test set
pub struct Evaluator<'a> {
    prompt_id: u32,
    scaler: ScoreScaler<'a>,
    ranges: Vec<ScoreRange>,
    test_features: FeatureBatch,
    ground_truth: Vec<Vec<i64>>,
    best: BestMetrics,
    current: Option<EpochMetrics>,
    epochs_seen: usize,
}

impl<'a> Evaluator<'a> {
    /// `ground_truth` holds the masked raw scores, one row per test essay
    pub fn new(
        schema: &'a RubricSchema,
        prompt_id: u32,
        test_features: FeatureBatch,
        ground_truth: Vec<Vec<i64>>,
    ) -> Result<Self> {
        let prompt = schema.prompt(prompt_id)?;
        let ranges = (0..prompt.item_count())
            .map(|item| prompt.range_for(item))
            .collect::<Result<Vec<_>>>()?;
        if let Some(row) = ground_truth.iter().find(|row| row.len() != ranges.len()) {
            return Err(EssayCvError::invalid_data(format!(
                "ground truth row has {} items, prompt {} scores {}",
                row.len(),
                prompt_id,
                ranges.len()
            )));
        }

        Ok(Evaluator {
            prompt_id,
            scaler: ScoreScaler::new(schema),
            best: BestMetrics::unset(ranges.len()),
            ranges,
            test_features,
            ground_truth,
            current: None,
            epochs_seen: 0,
        })
    }

    pub fn best(&self) -> &BestMetrics {
        &self.best
    }

    pub fn into_best(self) -> BestMetrics {
        self.best
    }

    /// Evaluate the model's current predictions for this fold's test set
    #[tracing::instrument(skip(self, model), fields(prompt = self.prompt_id, epoch = self.epochs_seen))]
    pub fn evaluate_from_reg<M: ScoringModel + ?Sized>(&mut self, model: &M) -> Result<EpochOutcome> {
        let predictions = model.predict(&self.test_features)?;
        self.check_shape(&predictions)?;

        let descaled = predictions
            .iter()
            .map(|row| self.descale_row(row))
            .collect::<Result<Vec<_>>>()?;

        let items = self
            .ranges
            .iter()
            .enumerate()
            .map(|(item, &range)| {
                let truth: Vec<i64> = self.ground_truth.iter().map(|r| r[item]).collect();
                let pred: Vec<i64> = descaled.iter().map(|r| r[item]).collect();
                MetricEngine::evaluate_item(&truth, &pred, range)
                    .map_err(|e| item_error(e, "score item", item))
            })
            .collect::<Result<Vec<_>>>()?;
        let metrics = EpochMetrics { items };

        let epoch = self.epochs_seen;
        let improved = self.best.offer(&metrics, epoch);
        tracing::debug!(
            epoch,
            improved,
            qwk = ?metrics.column(Statistic::Qwk),
            "epoch evaluated"
        );

        self.epochs_seen += 1;
        self.current = Some(metrics.clone());
        Ok(EpochOutcome {
            epoch,
            metrics,
            improved,
        })
    }

    /// Snapshot of the latest and best metrics; purely observational
    pub fn print_results(&self) -> String {
        match &self.current {
            Some(current) => render_snapshot(current, &self.best),
            None => String::new(),
        }
    }

    fn check_shape(&self, predictions: &[Vec<f64>]) -> Result<()> {
        let rows = self.ground_truth.len();
        let cols = self.ranges.len();
        if predictions.len() != rows || predictions.iter().any(|p| p.len() != cols) {
            let actual_cols = predictions
                .iter()
                .map(Vec::len)
                .find(|&c| c != cols)
                .unwrap_or(cols);
            return Err(EssayCvError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                actual_rows: predictions.len(),
                actual_cols,
            });
        }
        Ok(())
    }

    fn descale_row(&self, row: &[f64]) -> Result<Vec<i64>> {
        row.iter()
            .enumerate()
            .map(|(item, &value)| {
                self.scaler
                    .scale_up(value, item, self.prompt_id)
                    .map_err(|e| item_error(e, "descale prediction", item))
            })
            .collect()
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_results())
    }
}

fn item_error(err: EssayCvError, operation: &str, item: usize) -> EssayCvError {
    err.chain(
        format!("failed to {} for item {}", operation, item),
        Some(ErrorContext::new(operation).with_metadata("item", item)),
    )
}

/// Human snapshot of one epoch: its metrics followed by the best so far
pub fn render_snapshot(current: &EpochMetrics, best: &BestMetrics) -> String {
    let mut out = Block("CURRENT TEST", &current.items).to_string();
    if best.is_set() {
        out.push_str(&best.to_string());
    }
    out
}

struct Block<'m>(&'static str, &'m [ItemMetrics]);

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, self.0, self.1)
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, title: &str, items: &[ItemMetrics]) -> fmt::Result {
    for (label, stat) in [
        ("QWK ", Statistic::Qwk),
        ("LWK ", Statistic::Lwk),
        ("RMSE", Statistic::Rmse),
        ("MAE ", Statistic::Mae),
        ("CORR", Statistic::Corr),
    ] {
        let values: Vec<f64> = items.iter().map(|m| m.get(stat)).collect();
        writeln!(f, "[{}] {}: {}", title, label, format_stat_summary(&values))?;
    }
    Ok(())
}
