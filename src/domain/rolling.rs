//! Rolling window helpers over a single series.
//!
//! Warmup: the first `period - 1` entries are `None`.

/// Simple moving average, maintained as a running window sum.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if period == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let mut window_sum = 0.0_f64;
    for (i, &v) in values.iter().enumerate() {
        window_sum += v;
        if i >= period {
            window_sum -= values[i - period];
        }
        if i + 1 >= period {
            out.push(Some(window_sum / period as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Trailing window `values[i - period .. i]`, excluding index `i` itself.
pub fn trailing_window(values: &[f64], i: usize, period: usize) -> Option<&[f64]> {
    if period == 0 || i < period || i > values.len() {
        return None;
    }
    Some(&values[i - period..i])
}
