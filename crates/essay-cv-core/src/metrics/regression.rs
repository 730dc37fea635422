//! Correlation and error statistics on integer scores

/// Pearson correlation; 0.0 when either side has zero variance
pub fn pearson_correlation(a: &[i64], b: &[i64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;

    let mean_a = a[..n].iter().map(|&v| v as f64).sum::<f64>() / n_f;
    let mean_b = b[..n].iter().map(|&v| v as f64).sum::<f64>() / n_f;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    covariance / denom
}

pub fn root_mean_squared_error(a: &[i64], b: &[i64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| ((x - y) as f64).powi(2))
        .sum();
    (sum / n as f64).sqrt()
}

pub fn mean_absolute_error(a: &[i64], b: &[i64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(&x, &y)| (x - y).abs() as f64).sum();
    sum / n as f64
}
