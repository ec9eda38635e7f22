//! The numeric toolkit shared by the performance report and the risk gate.
//!
//! Every function is total: empty input, a single sample or a zero
//! denominator produce `0.0` instead of `NaN` or a panic.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Spread below this fraction of the mean's magnitude is rounding noise.
const FLAT_RELATIVE_STD: f64 = 1e-9;
/// Running-sum variances lose about half their digits to cancellation, so the
/// cut-off is applied to the variance against the squared mean.
const FLAT_RELATIVE_VARIANCE: f64 = 1e-12;

/// Sample (n - 1) standard deviation. Fewer than two samples yields 0, and so
/// does a sample whose values are equal up to floating-point rounding.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    let std = (sum_sq / (values.len() - 1) as f64).sqrt();
    if std <= FLAT_RELATIVE_STD * m.abs() { 0.0 } else { std }
}

/// Sample standard deviation from running sums, for callers that maintain
/// `sum` and `sum_sq` incrementally. Constant samples yield exactly 0.
pub fn sample_std_dev_from_sums(n: usize, sum: f64, sum_sq: f64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let n = n as f64;
    let m = sum / n;
    let variance = (sum_sq - sum * m) / (n - 1.0);
    if variance <= FLAT_RELATIVE_VARIANCE * m * m {
        return 0.0;
    }
    variance.sqrt()
}

/// `numerator / denominator`, or 0 when the quotient is not a finite number.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}

/// `pct`-th percentile (0..=100) of ascending `sorted`, interpolating linearly
/// between closest ranks.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Compounds per-period returns into a growth curve that starts at 1.0.
pub fn growth_curve(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    let mut level = 1.0;
    curve.push(level);
    for r in returns {
        level *= 1.0 + r;
        curve.push(level);
    }
    curve
}

/// Largest drop from a running peak to a later value, in the curve's own units.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let Some(&first) = curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut worst = 0.0_f64;
    for &value in curve {
        peak = peak.max(value);
        worst = worst.max(peak - value);
    }
    worst
}
