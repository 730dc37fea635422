//! Mapping between raw rubric scores and the model's [0, 1] target space
//!
//! Scaling is per prompt and per item: the overall score and the analytic
//! items generally have different ranges, so a vector is never scaled with
//! a single shared range.

use crate::error::{EssayCvError, Result};
use crate::rubric::RubricSchema;

#[derive(Debug, Clone, Copy)]
pub struct ScoreScaler<'a> {
    schema: &'a RubricSchema,
}

impl<'a> ScoreScaler<'a> {
    pub fn new(schema: &'a RubricSchema) -> Self {
        ScoreScaler { schema }
    }

    /// Normalize a raw score into [0, 1].
    ///
    /// Scores outside the rubric range are a data integrity error; they are
    /// never clamped on the way in.
    pub fn scale_down(&self, raw: i64, item: usize, prompt_id: u32) -> Result<f64> {
        let range = self.schema.range_for(prompt_id, item)?;
        if !range.contains(raw) {
            return Err(EssayCvError::ScoreOutOfRange {
                prompt_id,
                item,
                value: raw,
                min: range.min,
                max: range.max,
            });
        }
        Ok((raw - range.min) as f64 / range.span() as f64)
    }

    /// Map a normalized prediction back to the nearest valid integer score.
    ///
    /// Model output is not range checked, so overshoot (and NaN) is clamped
    /// into the rubric range rather than rejected.
    pub fn scale_up(&self, normalized: f64, item: usize, prompt_id: u32) -> Result<i64> {
        let range = self.schema.range_for(prompt_id, item)?;
        if normalized.is_nan() {
            return Ok(range.min);
        }
        let raw = (normalized * range.span() as f64 + range.min as f64).round();
        Ok(raw.clamp(range.min as f64, range.max as f64) as i64)
    }

    /// Scale a masked raw vector item by item
    pub fn scale_down_vector(&self, raw: &[i64], prompt_id: u32) -> Result<Vec<f64>> {
        raw.iter()
            .enumerate()
            .map(|(item, &value)| self.scale_down(value, item, prompt_id))
            .collect()
    }

    /// Descale a row of model output item by item
    pub fn scale_up_vector(&self, normalized: &[f64], prompt_id: u32) -> Result<Vec<i64>> {
        normalized
            .iter()
            .enumerate()
            .map(|(item, &value)| self.scale_up(value, item, prompt_id))
            .collect()
    }
}
