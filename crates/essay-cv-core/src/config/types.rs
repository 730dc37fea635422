//! Configuration type definitions

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EssayCvError;
use crate::rubric::PromptRubric;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "essay-cv.toml";

/// Run configuration, built once at start and shared read-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root of the fold directories (`{data_path}/{prompt}/fold-{k}/`)
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Hand-crafted linguistic features keyed by essay id
    #[serde(default = "default_features_path")]
    pub features_path: PathBuf,

    /// Readability features keyed by essay id
    #[serde(default = "default_readability_path")]
    pub readability_path: PathBuf,

    /// Vocabulary cap, reserved tokens included
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    /// Number of cross-validation folds
    #[serde(default = "default_folds")]
    pub folds: usize,

    /// Training epochs per fold
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Artifacts land in `{output_root}/{seed}/{input}/`
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    #[serde(default)]
    pub model: ModelConfig,

    /// Rubric override; the built-in ASAP table is used when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<PromptRubric>,
}

/// Baseline scorer hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// L2 penalty on weights
    #[serde(default)]
    pub l2: f64,
}

/// Which tokenized view of the essays feeds the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Word tokens, lower-cased
    #[default]
    Word,
    /// Part-of-speech tags
    Pos,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Word => "word",
            InputKind::Pos => "pos",
        }
    }
}

impl FromStr for InputKind {
    type Err = EssayCvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word" => Ok(InputKind::Word),
            "pos" => Ok(InputKind::Pos),
            other => Err(EssayCvError::unsupported("input", other, "word, pos")),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            data_path: default_data_path(),
            features_path: default_features_path(),
            readability_path: default_readability_path(),
            vocab_size: default_vocab_size(),
            folds: default_folds(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            output_root: default_output_root(),
            model: ModelConfig::default(),
            prompts: Vec::new(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            learning_rate: default_learning_rate(),
            l2: 0.0,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/cv")
}

fn default_features_path() -> PathBuf {
    PathBuf::from("data/hand_crafted_v3.json")
}

fn default_readability_path() -> PathBuf {
    PathBuf::from("data/allreadability.json")
}

fn default_vocab_size() -> usize {
    4000
}

fn default_folds() -> usize {
    5
}

fn default_epochs() -> usize {
    50
}

fn default_batch_size() -> usize {
    10
}

fn default_output_root() -> PathBuf {
    PathBuf::from("outputs/CTS")
}

fn default_learning_rate() -> f64 {
    0.05
}
