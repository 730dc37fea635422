//! Fold data: essays, their features, and their raw scores
//!
//! Essays arrive already segmented into sentences and tokens. This module
//! turns them into the padded index matrices and feature vectors the model
//! consumes, keeping raw integer scores alongside for evaluation.

mod loader;
mod padding;
mod vocab;

use serde::{Deserialize, Serialize};

pub use loader::JsonFoldLoader;
pub use padding::pad_hierarchical;
pub use vocab::{Vocab, PAD_INDEX, UNK_INDEX};

use crate::error::Result;

/// One essay as stored in a fold file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayRecord {
    pub essay_id: u64,
    pub prompt_id: u32,
    /// Full raw score vector, one slot per global item (`-1` when unscored)
    pub scores: Vec<i64>,
    /// Word tokens per sentence
    #[serde(default)]
    pub words: Vec<Vec<String>>,
    /// POS tags per sentence
    #[serde(default)]
    pub pos: Vec<Vec<String>>,
}

/// Model inputs for a set of essays, one row per essay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBatch {
    /// Padded token indices, flattened to `max_sentnum * max_sentlen`
    pub tokens: Vec<Vec<usize>>,
    pub linguistic: Vec<Vec<f64>>,
    pub readability: Vec<Vec<f64>>,
}

impl FeatureBatch {
    pub fn len(&self) -> usize {
        self.tokens
            .len()
            .max(self.linguistic.len())
            .max(self.readability.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn token_dim(&self) -> usize {
        self.tokens.first().map_or(0, Vec::len)
    }

    pub fn linguistic_dim(&self) -> usize {
        self.linguistic.first().map_or(0, Vec::len)
    }

    pub fn readability_dim(&self) -> usize {
        self.readability.first().map_or(0, Vec::len)
    }
}

/// Training and test material for one fold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldData {
    pub train: FeatureBatch,
    pub test: FeatureBatch,
    /// Full raw score vectors (before masking)
    pub train_scores: Vec<Vec<i64>>,
    pub test_scores: Vec<Vec<i64>>,
    pub train_prompts: Vec<u32>,
    pub test_prompts: Vec<u32>,
    /// Size of the vocabulary token indices are drawn from
    pub vocab_len: usize,
    pub max_sentnum: usize,
    pub max_sentlen: usize,
}

/// Supplies fold data to the cross-validation loop
pub trait FoldSource {
    fn load_fold(&mut self, fold: usize) -> Result<FoldData>;
}
