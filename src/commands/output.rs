//! Human and JSON rendering of run progress and results

use std::path::Path;

use essay_cv_core::cv::{EpochObserver, FinalReport};
use essay_cv_core::error::Result;
use essay_cv_core::evaluator::{render_snapshot, BestMetrics};
use essay_cv_core::format::OutputFormat;
use essay_cv_core::metrics::{EpochMetrics, Statistic};

use crate::cli::Cli;

/// Prints per-epoch snapshots in human mode
pub struct ProgressPrinter {
    enabled: bool,
    banner: String,
}

impl ProgressPrinter {
    pub fn new(cli: &Cli) -> Self {
        ProgressPrinter {
            enabled: cli.format == OutputFormat::Human && !cli.quiet,
            banner: banner(cli),
        }
    }
}

impl EpochObserver for ProgressPrinter {
    fn on_fold_start(&mut self, fold: usize, folds: usize) {
        if self.enabled {
            println!("==== FOLD {} / {} ====", fold + 1, folds);
        }
    }

    fn on_epoch_start(&mut self, _fold: usize, epoch: usize, epochs: usize) {
        if self.enabled {
            println!("{}", self.banner);
            println!("{} / {} EPOCHS", epoch + 1, epochs);
        }
    }

    fn on_epoch(&mut self, _fold: usize, _epoch: usize, current: &EpochMetrics, best: &BestMetrics) {
        if self.enabled {
            print!("{}", render_snapshot(current, best));
        }
    }
}

fn banner(cli: &Cli) -> String {
    format!(
        "Prompt ID: {}, Seed: {}, Input_seq: {}",
        cli.prompt_id, cli.seed, cli.input
    )
}

pub fn print_banner(cli: &Cli) {
    if cli.format == OutputFormat::Human && !cli.quiet {
        println!("{}", banner(cli));
    }
}

pub fn print_report(cli: &Cli, report: &FinalReport, artifact_dir: &Path) -> Result<()> {
    match cli.format {
        OutputFormat::Human => {
            print!("{}", report.render_human());
            if !cli.quiet {
                println!("Artifacts: {}", artifact_dir.display());
            }
        }
        OutputFormat::Json => {
            let mut value = serde_json::to_value(report)?;
            let means: serde_json::Map<String, serde_json::Value> = Statistic::ALL
                .iter()
                .map(|stat| (stat.name().to_string(), report.mean_of(*stat).into()))
                .collect();
            value["mean"] = serde_json::Value::Object(means);
            value["artifact_dir"] = artifact_dir.display().to_string().into();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
