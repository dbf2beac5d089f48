//! Simple Moving Average (SMA).
//!
//! True rolling mean of a close-price window (§3 general sentinel rule —
//! unlike `ema`/`atr`/`rsi`, a full `period`-length window is required, so
//! the first `period-1` rows are `NaN`).

/// SMA over `period`. Output column name is `sma<period>` (§4.2).
pub fn sma(close: &[f64], period: usize) -> Vec<f64> {
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
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}
