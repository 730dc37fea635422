//! The scoring model seam
//!
//! The harness owns a model only as a mutable resource: it trains it one
//! epoch at a time and asks it for normalized predictions. It never clones
//! or snapshots it.

mod linear;

pub use linear::{LinearScorer, LinearScorerFactory};

use crate::data::FeatureBatch;
use crate::error::Result;

/// Dimensions a fold's model is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelShape {
    pub vocab_len: usize,
    pub token_dim: usize,
    pub linguistic_dim: usize,
    pub readability_dim: usize,
    /// One output per masked rubric item
    pub outputs: usize,
}

/// A regressor mapping essay features to one normalized score per item
pub trait ScoringModel {
    /// Train for exactly one epoch on scaled targets (one row per essay)
    fn train_one_epoch(&mut self, features: &FeatureBatch, targets: &[Vec<f64>]) -> Result<()>;

    /// Normalized predictions, one row per essay, one column per item
    fn predict(&self, features: &FeatureBatch) -> Result<Vec<Vec<f64>>>;
}

impl<M: ScoringModel + ?Sized> ScoringModel for Box<M> {
    fn train_one_epoch(&mut self, features: &FeatureBatch, targets: &[Vec<f64>]) -> Result<()> {
        (**self).train_one_epoch(features, targets)
    }

    fn predict(&self, features: &FeatureBatch) -> Result<Vec<Vec<f64>>> {
        (**self).predict(features)
    }
}

/// Builds a fresh model for each fold
pub trait ModelFactory {
    type Model: ScoringModel;

    fn build(&mut self, shape: &ModelShape, fold: usize) -> Result<Self::Model>;
}

impl<M, F> ModelFactory for F
where
    M: ScoringModel,
    F: FnMut(&ModelShape, usize) -> Result<M>,
{
    type Model = M;

    fn build(&mut self, shape: &ModelShape, fold: usize) -> Result<M> {
        self(shape, fold)
    }
}
