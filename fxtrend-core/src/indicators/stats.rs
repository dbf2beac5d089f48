//! Rolling statistics: population standard deviation and z-score.
//!
//! Both are true rolling-window computations over `period` rows (§3
//! general sentinel rule — first `period-1` rows are `NaN`). Population
//! variance divides by `N`, per spec.md §4.2's explicit "(population)"
//! annotation — `original_source`'s Polars `rolling_std` call relies on an
//! incidental library default (sample, ddof=1) that the spec text
//! overrides.

/// Rolling population standard deviation over `period`. Output column name
/// is `std<period>` (§4.2).
pub fn std(close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &close[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        result[i] = variance.sqrt();
    }
    result
}

/// Rolling z-score: `(x[i] - rolling_mean) / rolling_std`. `std == 0.0`
/// falls back to `0.0` rather than propagating `NaN`/`inf`, matching the
/// same flat-window convention used by `stoch_rsi`. Output column name is
/// `zscore<period>` (§4.2).
pub fn zscore(close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let stds = std(close, period);
    for i in (period - 1)..n {
        let window = &close[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let sd = stds[i];
        result[i] = if sd == 0.0 { 0.0 } else { (close[i] - mean) / sd };
    }
    result
}
