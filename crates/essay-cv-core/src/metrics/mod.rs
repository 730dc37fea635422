//! Agreement and error statistics between human and predicted scores
//!
//! Every statistic is computed on the raw integer rubric scale, one item at
//! a time. Nothing here aggregates across items or folds.

mod kappa;
mod regression;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EssayCvError, Result};
use crate::rubric::ScoreRange;

use kappa::{weighted_kappa, Weighting};
pub use regression::{mean_absolute_error, pearson_correlation, root_mean_squared_error};

/// The five statistics reported per item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Qwk,
    Lwk,
    Rmse,
    Mae,
    Corr,
}

impl Statistic {
    /// Report order
    pub const ALL: [Statistic; 5] = [
        Statistic::Qwk,
        Statistic::Lwk,
        Statistic::Rmse,
        Statistic::Mae,
        Statistic::Corr,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Qwk => "qwk",
            Statistic::Lwk => "lwk",
            Statistic::Rmse => "rmse",
            Statistic::Mae => "mae",
            Statistic::Corr => "corr",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Statistics for one item over one fold's test set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemMetrics {
    pub qwk: f64,
    pub lwk: f64,
    pub corr: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl ItemMetrics {
    pub fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Qwk => self.qwk,
            Statistic::Lwk => self.lwk,
            Statistic::Rmse => self.rmse,
            Statistic::Mae => self.mae,
            Statistic::Corr => self.corr,
        }
    }
}

/// Per-item statistics from a single epoch's evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub items: Vec<ItemMetrics>,
}

impl EpochMetrics {
    /// One statistic across all items, in item order
    pub fn column(&self, stat: Statistic) -> Vec<f64> {
        self.items.iter().map(|m| m.get(stat)).collect()
    }

    pub fn overall(&self) -> Option<&ItemMetrics> {
        self.items.first()
    }
}

/// Stateless calculator for the per-item statistics
pub struct MetricEngine;

impl MetricEngine {
    /// Compute all five statistics for one item.
    ///
    /// Both sequences must have equal length and every value must lie in
    /// `range`; descaled predictions satisfy this by construction.
    pub fn evaluate_item(truth: &[i64], pred: &[i64], range: ScoreRange) -> Result<ItemMetrics> {
        if truth.len() != pred.len() {
            return Err(EssayCvError::ShapeMismatch {
                expected_rows: truth.len(),
                expected_cols: 1,
                actual_rows: pred.len(),
                actual_cols: 1,
            });
        }
        if let Some(&value) = truth.iter().chain(pred).find(|v| !range.contains(**v)) {
            return Err(EssayCvError::invalid_data(format!(
                "score {} outside metric range [{}, {}]",
                value, range.min, range.max
            )));
        }

        Ok(ItemMetrics {
            qwk: weighted_kappa(truth, pred, range, Weighting::Quadratic),
            lwk: weighted_kappa(truth, pred, range, Weighting::Linear),
            corr: pearson_correlation(truth, pred),
            rmse: root_mean_squared_error(truth, pred),
            mae: mean_absolute_error(truth, pred),
        })
    }

    /// Evaluate every item of an essay-major score matrix.
    ///
    /// `truth` and `pred` hold one row per essay and one column per item;
    /// `ranges` gives each column's rubric range.
    pub fn evaluate(
        truth: &[Vec<i64>],
        pred: &[Vec<i64>],
        ranges: &[ScoreRange],
    ) -> Result<EpochMetrics> {
        let items = ranges
            .iter()
            .enumerate()
            .map(|(item, &range)| {
                let truth_col = column(truth, item)?;
                let pred_col = column(pred, item)?;
                Self::evaluate_item(&truth_col, &pred_col, range)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(EpochMetrics { items })
    }
}

fn column(rows: &[Vec<i64>], item: usize) -> Result<Vec<i64>> {
    rows.iter()
        .map(|row| {
            row.get(item).copied().ok_or_else(|| {
                EssayCvError::invalid_data(format!(
                    "score row has {} items, needed item {}",
                    row.len(),
                    item
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
