//! Weighted Cohen's kappa over a fixed integer rating scale

use crate::rubric::ScoreRange;

/// Disagreement weighting between rating categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Weighting {
    Linear,
    Quadratic,
}

impl Weighting {
    fn weight(&self, i: usize, j: usize, categories: usize) -> f64 {
        let distance = i.abs_diff(j) as f64;
        let scale = (categories - 1) as f64;
        match self {
            Weighting::Linear => distance / scale,
            Weighting::Quadratic => (distance * distance) / (scale * scale),
        }
    }
}

/// Weighted kappa between two raters on the scale `range`.
///
/// Values outside `range` are clamped onto its nearest bound, so callers
/// range-check first (see `MetricEngine::evaluate_item`). When the expected
/// disagreement is zero both raters gave one identical constant score, which
/// is returned as perfect agreement (1.0). Empty input yields 0.0.
pub(crate) fn weighted_kappa(
    a: &[i64],
    b: &[i64],
    range: ScoreRange,
    weighting: Weighting,
) -> f64 {
    let categories = range.categories();
    let n = a.len().min(b.len());
    if n == 0 || categories < 2 {
        return 0.0;
    }

    let index = |v: i64| (range.clamp(v) - range.min) as usize;

    let mut observed = vec![vec![0.0_f64; categories]; categories];
    let mut hist_a = vec![0.0_f64; categories];
    let mut hist_b = vec![0.0_f64; categories];
    for (&x, &y) in a.iter().zip(b) {
        let (i, j) = (index(x), index(y));
        observed[i][j] += 1.0;
        hist_a[i] += 1.0;
        hist_b[j] += 1.0;
    }

    let total = n as f64;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..categories {
        for j in 0..categories {
            let w = weighting.weight(i, j, categories);
            numerator += w * observed[i][j] / total;
            denominator += w * hist_a[i] * hist_b[j] / (total * total);
        }
    }

    if denominator == 0.0 {
        return 1.0;
    }
    1.0 - numerator / denominator
}
