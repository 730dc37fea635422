//! CLI argument parsing for essay-cv

pub mod parse;

use std::path::PathBuf;

use clap::Parser;

use essay_cv_core::config::InputKind;
use essay_cv_core::format::OutputFormat;
use parse::{parse_input_kind, parse_output_format};

/// Cross-validated multi-trait essay scoring
#[derive(Parser, Debug)]
#[command(name = "essay-cv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Prompt whose essays and rubric are used
    #[arg(long = "prompt_id", default_value_t = 1)]
    pub prompt_id: u32,

    /// Seed for every stochastic component
    #[arg(long, default_value_t = 12)]
    pub seed: u64,

    /// Token view fed to the model (word or pos)
    #[arg(long, default_value = "word", value_parser = parse_input_kind)]
    pub input: InputKind,

    /// Configuration file (defaults to ./essay-cv.toml when present)
    #[arg(long, env = "ESSAY_CV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (human or json)
    #[arg(long, default_value = "human", value_parser = parse_output_format)]
    pub format: OutputFormat,

    /// Suppress per-epoch progress
    #[arg(long, short)]
    pub quiet: bool,

    /// Debug logging for both crates
    #[arg(long, short)]
    pub verbose: bool,

    /// Log filter: a level ("info") or full directives
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}
