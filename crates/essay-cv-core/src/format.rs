//! Output format handling and number rendering shared by reports
//!
//! Supports two output formats:
//! - human: Readable summary lines for terminal use
//! - json: Stable, machine-readable JSON

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EssayCvError;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for machine consumption
    Json,
}

impl FromStr for OutputFormat {
    type Err = EssayCvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(EssayCvError::unsupported("format", other, "human, json")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Render values rounded to three decimals: `[0.712, 0.65, 1.0]`
pub fn format_item_values(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format_rounded(*v)).collect();
    format!("[{}]", parts.join(", "))
}

/// `Mean -> 0.712, Each item -> [..]`
pub fn format_stat_summary(values: &[f64]) -> String {
    format!(
        "Mean -> {:.3}, Each item -> {}",
        mean(values),
        format_item_values(values)
    )
}

fn format_rounded(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    // Debug keeps a trailing ".0" on whole numbers
    format!("{:?}", rounded + 0.0)
}
