//! Rubric schema: which score items each prompt uses and their raw ranges
//!
//! Raw score vectors always carry one slot per globally known item
//! ([`SCORE_POSITIONS`]); a prompt selects the subset it applies through its
//! attribute mask. Item 0 is always the overall score.

mod asap;
mod selector;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EssayCvError, Result};

pub use selector::{AttributeMask, AttributeSelector, PromptLayout};

/// Global score vector layout, in raw-data slot order.
pub const SCORE_POSITIONS: [&str; 9] = [
    "score",
    "content",
    "organization",
    "word_choice",
    "sentence_fluency",
    "conventions",
    "prompt_adherence",
    "language",
    "narrativity",
];

/// Slot of the overall score in both raw and masked vectors.
pub const OVERALL_ITEM: usize = 0;

/// Sentinel used in raw data for items a prompt does not score.
pub const MISSING_SCORE: i64 = -1;

/// Widest score range a rubric may declare; kappa allocates a square matrix of this side.
pub const MAX_SCORE_CATEGORIES: i64 = 1000;

/// Look up the raw-vector slot of a named item
pub fn position_of(item: &str) -> Option<usize> {
    SCORE_POSITIONS.iter().position(|name| *name == item)
}

/// Inclusive integer score range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct ScoreRange {
    pub min: i64,
    pub max: i64,
}

impl ScoreRange {
    pub const fn new(min: i64, max: i64) -> Self {
        ScoreRange { min, max }
    }

    /// Distance between the bounds (the scaling denominator)
    pub fn span(&self) -> i64 {
        self.max - self.min
    }

    /// Number of distinct integer scores in the range
    pub fn categories(&self) -> usize {
        (self.max - self.min + 1).max(0) as usize
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

impl From<(i64, i64)> for ScoreRange {
    fn from((min, max): (i64, i64)) -> Self {
        ScoreRange { min, max }
    }
}

impl From<ScoreRange> for (i64, i64) {
    fn from(range: ScoreRange) -> Self {
        (range.min, range.max)
    }
}

/// Rubric for a single prompt.
///
/// `items` names the analytic items (not including the overall score) in
/// the order they appear in the masked vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRubric {
    pub id: u32,
    pub overall: ScoreRange,
    pub analytic: ScoreRange,
    #[serde(default)]
    pub items: Vec<String>,
}

impl PromptRubric {
    pub fn new(id: u32, overall: (i64, i64), analytic: (i64, i64), items: &[&str]) -> Self {
        PromptRubric {
            id,
            overall: overall.into(),
            analytic: analytic.into(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Total items scored for this prompt, overall included
    pub fn item_count(&self) -> usize {
        1 + self.items.len()
    }

    /// Range of the item at a masked index
    pub fn range_for(&self, item: usize) -> Result<ScoreRange> {
        if item == OVERALL_ITEM {
            Ok(self.overall)
        } else if item < self.item_count() {
            Ok(self.analytic)
        } else {
            Err(EssayCvError::invalid_value(
                "item index",
                format!(
                    "{} (prompt {} has {} items)",
                    item,
                    self.id,
                    self.item_count()
                ),
            ))
        }
    }

    /// Item names in masked order, starting with the overall score
    pub fn item_names(&self) -> Vec<String> {
        std::iter::once(SCORE_POSITIONS[OVERALL_ITEM].to_string())
            .chain(self.items.iter().cloned())
            .collect()
    }

    fn validate(&self) -> Result<()> {
        for (name, range) in [("score", self.overall), ("analytic", self.analytic)] {
            let width = range.max.checked_sub(range.min);
            if !matches!(width, Some(w) if w > 0 && w < MAX_SCORE_CATEGORIES) {
                return Err(EssayCvError::InvalidRange {
                    prompt_id: self.id,
                    item: name.to_string(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let mut seen = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match position_of(item) {
                None | Some(OVERALL_ITEM) => {
                    return Err(EssayCvError::unsupported(
                        "rubric item",
                        item,
                        SCORE_POSITIONS[1..].join(", "),
                    ))
                }
                Some(_) if seen.contains(&item) => {
                    return Err(EssayCvError::InvalidConfig {
                        reason: format!("prompt {} lists item '{}' twice", self.id, item),
                    })
                }
                Some(_) => seen.push(item),
            }
        }
        Ok(())
    }
}

/// Process-wide, read-only rubric configuration keyed by prompt id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricSchema {
    prompts: BTreeMap<u32, PromptRubric>,
}

impl RubricSchema {
    /// Build a schema from prompt definitions, validating every range
    pub fn from_prompts(prompts: impl IntoIterator<Item = PromptRubric>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for prompt in prompts {
            prompt.validate()?;
            if map.insert(prompt.id, prompt).is_some() {
                return Err(EssayCvError::InvalidConfig {
                    reason: "duplicate prompt id in rubric".to_string(),
                });
            }
        }
        if map.is_empty() {
            return Err(EssayCvError::InvalidConfig {
                reason: "rubric defines no prompts".to_string(),
            });
        }
        Ok(RubricSchema { prompts: map })
    }

    /// Built-in ASAP / ASAP++ rubric for prompts 1 through 8
    pub fn asap() -> Self {
        RubricSchema {
            prompts: asap::prompts().into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn prompt(&self, prompt_id: u32) -> Result<&PromptRubric> {
        self.prompts
            .get(&prompt_id)
            .ok_or(EssayCvError::UnknownPrompt { prompt_id })
    }

    pub fn prompt_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.prompts.keys().copied()
    }

    pub fn item_count(&self, prompt_id: u32) -> Result<usize> {
        Ok(self.prompt(prompt_id)?.item_count())
    }

    /// Range of a masked item for a prompt
    pub fn range_for(&self, prompt_id: u32, item: usize) -> Result<ScoreRange> {
        self.prompt(prompt_id)?.range_for(item)
    }
}

impl Default for RubricSchema {
    fn default() -> Self {
        RubricSchema::asap()
    }
}
