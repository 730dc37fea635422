//! Attribute selection: which raw-vector slots a prompt scores

use super::{position_of, RubricSchema, ScoreRange, OVERALL_ITEM, SCORE_POSITIONS};
use crate::error::{EssayCvError, Result};

/// Ordered raw-vector positions applicable to one prompt.
///
/// Position 0 of the mask is always the overall score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMask {
    prompt_id: u32,
    positions: Vec<usize>,
}

impl AttributeMask {
    pub fn prompt_id(&self) -> u32 {
        self.prompt_id
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pick the masked items out of a full raw score vector
    pub fn apply(&self, raw: &[i64]) -> Result<Vec<i64>> {
        if raw.len() != SCORE_POSITIONS.len() {
            return Err(EssayCvError::invalid_data(format!(
                "raw score vector has {} slots, expected {}",
                raw.len(),
                SCORE_POSITIONS.len()
            )));
        }
        Ok(self.positions.iter().map(|&pos| raw[pos]).collect())
    }
}

/// Everything a fold needs to know about a prompt's rubric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLayout {
    pub num_items: usize,
    pub overall_range: ScoreRange,
    pub analytic_range: ScoreRange,
    pub mask: AttributeMask,
}

/// Derives attribute masks from a rubric schema
#[derive(Debug, Clone, Copy)]
pub struct AttributeSelector<'a> {
    schema: &'a RubricSchema,
}

impl<'a> AttributeSelector<'a> {
    pub fn new(schema: &'a RubricSchema) -> Self {
        AttributeSelector { schema }
    }

    pub fn mask_for(&self, prompt_id: u32) -> Result<AttributeMask> {
        let prompt = self.schema.prompt(prompt_id)?;
        let mut positions = Vec::with_capacity(prompt.item_count());
        positions.push(OVERALL_ITEM);
        for item in &prompt.items {
            // Schema construction validated every name
            let pos = position_of(item).ok_or_else(|| {
                EssayCvError::unsupported("rubric item", item, SCORE_POSITIONS.join(", "))
            })?;
            positions.push(pos);
        }
        Ok(AttributeMask {
            prompt_id,
            positions,
        })
    }

    pub fn layout(&self, prompt_id: u32) -> Result<PromptLayout> {
        let prompt = self.schema.prompt(prompt_id)?;
        Ok(PromptLayout {
            num_items: prompt.item_count(),
            overall_range: prompt.overall,
            analytic_range: prompt.analytic,
            mask: self.mask_for(prompt_id)?,
        })
    }
}
