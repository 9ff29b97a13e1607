//! Shared statistics helpers.
//!
//! Every ratio in the metrics and benchmark calculators goes through
//! [`safe_ratio`]: a zero or non-finite denominator, or a non-finite quotient,
//! yields 0.0. Undefined statistics never surface as NaN or infinity.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// `numerator / denominator`, or 0.0 when that is undefined.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Zero below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Sample covariance of two equal-length series. Zero below two values.
pub fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (ma, mb) = (mean(a), mean(b));
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / (n - 1) as f64
}

/// `Π(1 + r) - 1`.
pub fn compound_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, &r| acc * (1.0 + r)) - 1.0
}

/// `(1 + total)^(252 / periods) - 1`, zero for an empty series.
pub fn annualize_return(total_return: f64, periods: usize) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    let value = (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / periods as f64) - 1.0;
    if value.is_finite() { value } else { 0.0 }
}

/// Sample volatility scaled to a year of trading periods.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Linearly interpolated quantile, `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Running decline from the highest value seen so far. Always <= 0.
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::MIN;
    values
        .iter()
        .map(|&v| {
            if v > peak {
                peak = v;
            }
            if peak > 0.0 { (v - peak) / peak } else { 0.0 }
        })
        .collect()
}
