//! The cross-validation run behind the `essay-cv` command

use std::env;
use std::time::Instant;

use essay_cv_core::config::RunConfig;
use essay_cv_core::cv::{CrossValidation, FinalReport};
use essay_cv_core::data::JsonFoldLoader;
use essay_cv_core::error::{EssayCvError, Result};
use essay_cv_core::metrics::Statistic;
use essay_cv_core::model::LinearScorerFactory;

use super::output::{print_banner, print_report, ProgressPrinter};
use crate::cli::Cli;

pub fn execute(cli: &Cli, start: Instant) -> Result<()> {
    let cwd = env::current_dir()
        .map_err(|e| EssayCvError::io_operation("resolve working directory", ".", e))?;
    let config = RunConfig::discover(cli.config.as_deref(), &cwd)?;
    let schema = config.rubric()?;
    tracing::debug!(elapsed = ?start.elapsed(), "load_config");

    let cv = CrossValidation::new(&schema, cli.prompt_id, config.folds, config.epochs)?;
    tracing::info!(
        prompt = cli.prompt_id,
        seed = cli.seed,
        input = %cli.input,
        folds = config.folds,
        epochs = config.epochs,
        "starting cross-validation"
    );

    let mut source = JsonFoldLoader::new(&config, cli.prompt_id, cli.input);
    let mut factory = LinearScorerFactory::new(config.model.clone(), config.batch_size, cli.seed);
    let mut progress = ProgressPrinter::new(cli);

    print_banner(cli);
    let report = cv.run_observed(&mut source, &mut factory, &mut progress)?;
    tracing::debug!(elapsed = ?start.elapsed(), "cross_validation");
    tracing::info!(
        qwk = report.mean_of(Statistic::Qwk),
        rmse = report.mean_of(Statistic::Rmse),
        "cross-validation finished"
    );

    let dir = FinalReport::artifact_dir(&config.output_root, cli.seed, cli.input);
    let written = report.write_csv_artifacts(&dir)?;
    tracing::info!(dir = %dir.display(), files = written.len(), "wrote artifacts");

    print_report(cli, &report, &dir)
}
