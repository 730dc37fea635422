//! The aggregated result of a cross-validation run

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::InputKind;
use crate::error::{EssayCvError, Result};
use crate::evaluator::BestMetrics;
use crate::format::{format_stat_summary, mean};
use crate::metrics::Statistic;

/// Item-wise means of every fold's best-epoch statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    pub prompt_id: u32,
    pub folds: usize,
    pub item_names: Vec<String>,
    pub qwk: Vec<f64>,
    pub lwk: Vec<f64>,
    pub rmse: Vec<f64>,
    pub mae: Vec<f64>,
    pub corr: Vec<f64>,
}

impl FinalReport {
    /// Average each statistic across folds, item by item
    pub fn aggregate(prompt_id: u32, item_names: Vec<String>, per_fold: &[BestMetrics]) -> Result<Self> {
        if per_fold.is_empty() {
            return Err(EssayCvError::invalid_data("no folds to aggregate"));
        }
        let num_items = item_names.len();
        if let Some((fold, best)) = per_fold
            .iter()
            .enumerate()
            .find(|(_, best)| best.items.len() != num_items)
        {
            return Err(EssayCvError::invalid_data(format!(
                "fold {} reported {} items, expected {}",
                fold,
                best.items.len(),
                num_items
            )));
        }

        let column_mean = |stat: Statistic| -> Vec<f64> {
            (0..num_items)
                .map(|item| {
                    let values: Vec<f64> = per_fold.iter().map(|b| b.items[item].get(stat)).collect();
                    mean(&values)
                })
                .collect()
        };

        Ok(FinalReport {
            prompt_id,
            folds: per_fold.len(),
            qwk: column_mean(Statistic::Qwk),
            lwk: column_mean(Statistic::Lwk),
            rmse: column_mean(Statistic::Rmse),
            mae: column_mean(Statistic::Mae),
            corr: column_mean(Statistic::Corr),
            item_names,
        })
    }

    pub fn values(&self, stat: Statistic) -> &[f64] {
        match stat {
            Statistic::Qwk => &self.qwk,
            Statistic::Lwk => &self.lwk,
            Statistic::Rmse => &self.rmse,
            Statistic::Mae => &self.mae,
            Statistic::Corr => &self.corr,
        }
    }

    /// Mean across items of one aggregated statistic
    pub fn mean_of(&self, stat: Statistic) -> f64 {
        mean(self.values(stat))
    }

    pub fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--------------------------------------------------------------");
        let _ = writeln!(out, "Final info (prompt {}, {} folds)", self.prompt_id, self.folds);
        let _ = writeln!(out, "Items: {}", self.item_names.join(", "));
        for stat in Statistic::ALL {
            let label = format!("TEST_{}:", stat.name().to_uppercase());
            let _ = writeln!(out, " {:<10} {}", label, format_stat_summary(self.values(stat)));
        }
        let _ = writeln!(out, "--------------------------------------------------------------");
        out
    }

    /// `{root}/{seed}/{input}`
    pub fn artifact_dir(root: &Path, seed: u64, input: InputKind) -> PathBuf {
        root.join(seed.to_string()).join(input.as_str())
    }

    /// Write one headerless CSV column per statistic, named `{stat}{prompt}.csv`
    pub fn write_csv_artifacts(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|e| {
            EssayCvError::io_operation("create artifact directory", dir.display().to_string(), e)
        })?;

        let mut written = Vec::with_capacity(Statistic::ALL.len());
        for stat in Statistic::ALL {
            let path = dir.join(format!("{}{}.csv", stat.name(), self.prompt_id));
            let mut body = String::new();
            for value in self.values(stat) {
                let _ = writeln!(body, "{}", value);
            }
            fs::write(&path, body).map_err(|e| {
                EssayCvError::io_operation("write artifact", path.display().to_string(), e)
            })?;
            tracing::debug!(path = %path.display(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }
}
