//! Baseline scorer: multi-output logistic-linear regression
//!
//! Inputs are the standardized linguistic and readability features plus a
//! normalized histogram over token indices. Outputs pass through a sigmoid
//! so predictions live in (0, 1) like the scaled targets.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{ModelFactory, ModelShape, ScoringModel};
use crate::config::ModelConfig;
use crate::data::{FeatureBatch, PAD_INDEX};
use crate::error::{EssayCvError, Result};

pub struct LinearScorer {
    shape: ModelShape,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    learning_rate: f64,
    l2: f64,
    batch_size: usize,
    rng: StdRng,
    /// Per-column (mean, std) of the dense features, fitted on first train
    scaling: Option<Vec<(f64, f64)>>,
}

impl LinearScorer {
    pub fn new(shape: ModelShape, config: &ModelConfig, batch_size: usize, seed: u64) -> Self {
        let dims = shape.linguistic_dim + shape.readability_dim + shape.vocab_len;
        LinearScorer {
            shape,
            weights: vec![vec![0.0; dims]; shape.outputs],
            bias: vec![0.0; shape.outputs],
            learning_rate: config.learning_rate,
            l2: config.l2,
            batch_size: batch_size.max(1),
            rng: StdRng::seed_from_u64(seed),
            scaling: None,
        }
    }

    fn dense_dim(&self) -> usize {
        self.shape.linguistic_dim + self.shape.readability_dim
    }

    fn fit_scaling(&mut self, features: &FeatureBatch) {
        let n = features.len().max(1) as f64;
        let dense = self.dense_dim();
        let mut stats = vec![(0.0, 0.0); dense];
        for row in 0..features.len() {
            for (col, value) in dense_values(features, row).enumerate().take(dense) {
                stats[col].0 += value / n;
            }
        }
        for row in 0..features.len() {
            for (col, value) in dense_values(features, row).enumerate().take(dense) {
                stats[col].1 += (value - stats[col].0).powi(2) / n;
            }
        }
        for stat in &mut stats {
            stat.1 = stat.1.sqrt();
            if stat.1 < 1e-12 {
                stat.1 = 1.0;
            }
        }
        self.scaling = Some(stats);
    }

    fn input_row(&self, features: &FeatureBatch, row: usize) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.dense_dim() + self.shape.vocab_len);
        for (col, value) in dense_values(features, row).enumerate() {
            let (mean, std) = self
                .scaling
                .as_ref()
                .and_then(|s| s.get(col).copied())
                .unwrap_or((0.0, 1.0));
            x.push((value - mean) / std);
        }

        let mut histogram = vec![0.0; self.shape.vocab_len];
        let mut count = 0.0;
        if let Some(tokens) = features.tokens.get(row) {
            for &token in tokens.iter().filter(|&&t| t != PAD_INDEX) {
                if let Some(slot) = histogram.get_mut(token) {
                    *slot += 1.0;
                    count += 1.0;
                }
            }
        }
        if count > 0.0 {
            histogram.iter_mut().for_each(|h| *h /= count);
        }
        x.extend(histogram);
        x
    }

    fn forward(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| sigmoid(dot(w, x) + b))
            .collect()
    }

    fn check_inputs(&self, features: &FeatureBatch) -> Result<()> {
        let dense = self.dense_dim();
        for row in 0..features.len() {
            let width = features.linguistic.get(row).map_or(0, Vec::len)
                + features.readability.get(row).map_or(0, Vec::len);
            if width != dense {
                return Err(EssayCvError::ShapeMismatch {
                    expected_rows: features.len(),
                    expected_cols: dense,
                    actual_rows: features.len(),
                    actual_cols: width,
                });
            }
        }
        Ok(())
    }
}

impl ScoringModel for LinearScorer {
    fn train_one_epoch(&mut self, features: &FeatureBatch, targets: &[Vec<f64>]) -> Result<()> {
        if targets.len() != features.len()
            || targets.iter().any(|t| t.len() != self.shape.outputs)
        {
            return Err(EssayCvError::ShapeMismatch {
                expected_rows: features.len(),
                expected_cols: self.shape.outputs,
                actual_rows: targets.len(),
                actual_cols: targets.first().map_or(0, Vec::len),
            });
        }
        self.check_inputs(features)?;
        if self.scaling.is_none() {
            self.fit_scaling(features);
        }

        let mut order: Vec<usize> = (0..features.len()).collect();
        order.shuffle(&mut self.rng);

        for batch in order.chunks(self.batch_size) {
            let dims = self.weights.first().map_or(0, Vec::len);
            let mut grad_w = vec![vec![0.0; dims]; self.shape.outputs];
            let mut grad_b = vec![0.0; self.shape.outputs];

            for &row in batch {
                let x = self.input_row(features, row);
                let pred = self.forward(&x);
                for (out, (&p, &y)) in pred.iter().zip(&targets[row]).enumerate() {
                    // d/dz of 0.5 * (sigmoid(z) - y)^2
                    let delta = (p - y) * p * (1.0 - p);
                    grad_b[out] += delta;
                    for (g, &xi) in grad_w[out].iter_mut().zip(&x) {
                        *g += delta * xi;
                    }
                }
            }

            let scale = self.learning_rate / batch.len() as f64;
            for out in 0..self.shape.outputs {
                for (w, g) in self.weights[out].iter_mut().zip(&grad_w[out]) {
                    *w -= scale * g + self.learning_rate * self.l2 * *w;
                }
                self.bias[out] -= scale * grad_b[out];
            }
        }
        Ok(())
    }

    fn predict(&self, features: &FeatureBatch) -> Result<Vec<Vec<f64>>> {
        self.check_inputs(features)?;
        Ok((0..features.len())
            .map(|row| self.forward(&self.input_row(features, row)))
            .collect())
    }
}

/// Builds one [`LinearScorer`] per fold, seeding each from the run seed
pub struct LinearScorerFactory {
    config: ModelConfig,
    batch_size: usize,
    seed: u64,
}

impl LinearScorerFactory {
    pub fn new(config: ModelConfig, batch_size: usize, seed: u64) -> Self {
        LinearScorerFactory {
            config,
            batch_size,
            seed,
        }
    }
}

impl ModelFactory for LinearScorerFactory {
    type Model = LinearScorer;

    fn build(&mut self, shape: &ModelShape, fold: usize) -> Result<LinearScorer> {
        tracing::debug!(fold, outputs = shape.outputs, vocab = shape.vocab_len, "building linear scorer");
        Ok(LinearScorer::new(
            *shape,
            &self.config,
            self.batch_size,
            self.seed.wrapping_add(fold as u64),
        ))
    }
}

fn dense_values(features: &FeatureBatch, row: usize) -> impl Iterator<Item = f64> + '_ {
    let linguistic = features.linguistic.get(row).map(Vec::as_slice).unwrap_or(&[]);
    let readability = features.readability.get(row).map(Vec::as_slice).unwrap_or(&[]);
    linguistic.iter().chain(readability).copied()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
