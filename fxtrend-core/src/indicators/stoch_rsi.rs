//! Stochastic RSI.
//!
//! `StochRSI = (rsi - rolling_min(rsi, period)) / (rolling_max(rsi, period) - rolling_min(rsi, period))`.
//! A true rolling window over the already-computed `rsi` column: the first
//! `period-1` rows are `NaN` (§3 general sentinel rule), even though `rsi`
//! itself has no warm-up NaN (§9.1). `max == min` (checked for exact
//! equality, not an epsilon band) falls back to `0.5`, per
//! `original_source/src/backtest/vectorized_rolling_window.py::calculate_stoch_rsi`.

/// StochRSI over `period`, computed from a pre-built `rsi` column. Output
/// column name is `stoch_rsi<period>` (§4.2).
pub fn stoch_rsi(rsi: &[f64], period: usize) -> Vec<f64> {
    let n = rsi.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &rsi[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        result[i] = if max == min {
            0.5
        } else {
            (rsi[i] - min) / (max - min)
        };
    }
    result
}
