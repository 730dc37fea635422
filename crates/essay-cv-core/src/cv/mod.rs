//! K-fold cross-validation over one prompt
//!
//! Folds run strictly one after another and epochs within a fold strictly
//! in order, since each epoch's training mutates the fold's model. Every
//! fold contributes its best-epoch statistics, and the report is their
//! item-wise mean.

mod report;


use std::time::Instant;

pub use report::FinalReport;

use crate::data::{FeatureBatch, FoldData, FoldSource};
use crate::error::{ErrorContext, EssayCvError, Result};
use crate::evaluator::{BestMetrics, EpochOutcome, Evaluator};
use crate::metrics::EpochMetrics;
use crate::model::{ModelFactory, ModelShape, ScoringModel};
use crate::rubric::{AttributeMask, AttributeSelector, RubricSchema};
use crate::scaling::ScoreScaler;

/// Hooks called as the run progresses; every method defaults to a no-op
pub trait EpochObserver {
    fn on_fold_start(&mut self, _fold: usize, _folds: usize) {}

    fn on_epoch_start(&mut self, _fold: usize, _epoch: usize, _epochs: usize) {}

    fn on_epoch(
        &mut self,
        _fold: usize,
        _epoch: usize,
        _current: &EpochMetrics,
        _best: &BestMetrics,
    ) {
    }

    fn on_fold_done(&mut self, _fold: usize, _best: &BestMetrics) {}
}

impl EpochObserver for () {}

/// Prepared material for one fold
struct PreparedFold {
    data: FoldData,
    train_targets: Vec<Vec<f64>>,
    test_truth: Vec<Vec<i64>>,
}

/// Cross-validation run for a single prompt
#[derive(Debug, Clone, Copy)]
pub struct CrossValidation<'a> {
    schema: &'a RubricSchema,
    prompt_id: u32,
    folds: usize,
    epochs: usize,
}

impl<'a> CrossValidation<'a> {
    pub fn new(schema: &'a RubricSchema, prompt_id: u32, folds: usize, epochs: usize) -> Result<Self> {
        schema.prompt(prompt_id)?;
        if folds == 0 {
            crate::bail_invalid!("folds", folds);
        }
        if epochs == 0 {
            crate::bail_invalid!("epochs", epochs);
        }
        Ok(CrossValidation {
            schema,
            prompt_id,
            folds,
            epochs,
        })
    }

    /// Run every fold and aggregate the per-fold best metrics
    pub fn run<S, F>(&self, source: &mut S, factory: &mut F) -> Result<FinalReport>
    where
        S: FoldSource + ?Sized,
        F: ModelFactory,
    {
        self.run_observed(source, factory, &mut ())
    }

    /// Like [`CrossValidation::run`], reporting progress to `observer`
    #[tracing::instrument(skip_all, fields(prompt = self.prompt_id, folds = self.folds, epochs = self.epochs))]
    pub fn run_observed<S, F, O>(
        &self,
        source: &mut S,
        factory: &mut F,
        observer: &mut O,
    ) -> Result<FinalReport>
    where
        S: FoldSource + ?Sized,
        F: ModelFactory,
        O: EpochObserver + ?Sized,
    {
        let mask = AttributeSelector::new(self.schema).mask_for(self.prompt_id)?;
        let item_names = self.schema.prompt(self.prompt_id)?.item_names();

        let mut per_fold = Vec::with_capacity(self.folds);
        for fold in 0..self.folds {
            tracing::info!(fold, folds = self.folds, "fold started");
            observer.on_fold_start(fold, self.folds);
            let best = self
                .run_fold(fold, &mask, source, factory, observer)
                .map_err(|e| {
                    let context = ErrorContext::new("run fold").with_metadata("fold", fold);
                    e.chain(format!("fold {} failed", fold), Some(context))
                })?;
            tracing::info!(fold, best_epoch = ?best.epoch, "fold finished");
            observer.on_fold_done(fold, &best);
            per_fold.push(best);
        }

        FinalReport::aggregate(self.prompt_id, item_names, &per_fold)
    }

    fn run_fold<S, F, O>(
        &self,
        fold: usize,
        mask: &AttributeMask,
        source: &mut S,
        factory: &mut F,
        observer: &mut O,
    ) -> Result<BestMetrics>
    where
        S: FoldSource + ?Sized,
        F: ModelFactory,
        O: EpochObserver + ?Sized,
    {
        let start = Instant::now();
        let prepared = self.prepare_fold(source.load_fold(fold)?, mask)?;
        crate::trace_time!(start, "prepare_fold", fold = fold);

        let shape = ModelShape {
            vocab_len: prepared.data.vocab_len,
            token_dim: prepared.data.train.token_dim(),
            linguistic_dim: prepared.data.train.linguistic_dim(),
            readability_dim: prepared.data.train.readability_dim(),
            outputs: mask.len(),
        };
        let mut model = factory.build(&shape, fold)?;
        let PreparedFold {
            data,
            train_targets,
            test_truth,
        } = prepared;
        let mut evaluator = Evaluator::new(self.schema, self.prompt_id, data.test, test_truth)?;

        for epoch in 0..self.epochs {
            observer.on_epoch_start(fold, epoch, self.epochs);
            let start = Instant::now();
            let outcome = train_and_evaluate(&mut model, &data.train, &train_targets, &mut evaluator)
                .map_err(|e| {
                    let context = ErrorContext::new("run epoch").with_metadata("epoch", epoch);
                    e.chain(format!("epoch {} failed", epoch), Some(context))
                })?;
            crate::trace_time!(start, "epoch", fold = fold, epoch = epoch);
            tracing::info!(
                prompt = self.prompt_id,
                fold,
                epoch = epoch + 1,
                epochs = self.epochs,
                improved = outcome.improved,
                "epoch finished"
            );
            observer.on_epoch(fold, epoch, &outcome.metrics, evaluator.best());
        }

        Ok(evaluator.into_best())
    }

    /// Mask and validate a fold's raw scores, scaling training targets
    fn prepare_fold(&self, data: FoldData, mask: &AttributeMask) -> Result<PreparedFold> {
        check_prompts(&data.train_prompts, self.prompt_id, "train")?;
        check_prompts(&data.test_prompts, self.prompt_id, "test")?;

        let scaler = ScoreScaler::new(self.schema);
        let train_targets = data
            .train_scores
            .iter()
            .enumerate()
            .map(|(essay, raw)| {
                mask.apply(raw)
                    .and_then(|masked| scaler.scale_down_vector(&masked, self.prompt_id))
                    .map_err(|e| essay_error(e, "train", essay))
            })
            .collect::<Result<Vec<_>>>()?;

        let test_truth = data
            .test_scores
            .iter()
            .enumerate()
            .map(|(essay, raw)| {
                mask.apply(raw)
                    .and_then(|masked| {
                        // scaling doubles as the range check for ground truth
                        scaler.scale_down_vector(&masked, self.prompt_id)?;
                        Ok(masked)
                    })
                    .map_err(|e| essay_error(e, "test", essay))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PreparedFold {
            data,
            train_targets,
            test_truth,
        })
    }
}

fn train_and_evaluate<M: ScoringModel>(
    model: &mut M,
    train: &FeatureBatch,
    targets: &[Vec<f64>],
    evaluator: &mut Evaluator<'_>,
) -> Result<EpochOutcome> {
    model.train_one_epoch(train, targets)?;
    evaluator.evaluate_from_reg(model)
}

fn check_prompts(prompts: &[u32], prompt_id: u32, split: &str) -> Result<()> {
    match prompts.iter().position(|&p| p != prompt_id) {
        Some(essay) => Err(EssayCvError::invalid_data(format!(
            "{} essay {} belongs to prompt {}, run is for prompt {}",
            split, essay, prompts[essay], prompt_id
        ))),
        None => Ok(()),
    }
}

fn essay_error(err: EssayCvError, split: &str, essay: usize) -> EssayCvError {
    let context = ErrorContext::new("prepare scores")
        .with_metadata("split", split)
        .with_metadata("essay", essay);
    err.chain(format!("invalid scores for {} essay {}", split, essay), Some(context))
}
