//! Moving averages over closing prices.

/// Simple moving average of the last `window` values.
///
/// `None` when `window` is zero or there are fewer than `window` values.
pub fn sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Simple moving average at every index, `None` until the window fills.
///
/// Uses a running sum, so the whole series costs O(n).
pub fn rolling_sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    let mut sum: f64 = values[..window].iter().sum();
    result[window - 1] = Some(sum / window as f64);

    for index in window..values.len() {
        sum += values[index] - values[index - window];
        result[index] = Some(sum / window as f64);
    }

    result
}
