//! Relative Strength Index (RSI).
//!
//! `RSI = 100 - 100/(1 + avg_gain/avg_loss)`, where `avg_gain`/`avg_loss` are
//! EMA-smoothed gain/loss series (§4.2, §9.1 — matching the `ema` helper's
//! α, not Wilder smoothing, per
//! `original_source/src/backtest/vectorized_rolling_window.py::calculate_rsi`).
//! `avg_loss == 0` ⇒ `RSI = 100`; no separate `avg_gain == 0` branch exists
//! in the source, so the zero-loss guard is checked before the division to
//! avoid a `0/0` NaN ever appearing.
//!
//! The first candle has no prior close to diff against; gain/loss there are
//! taken as `0.0` rather than left undefined, so `avg_gain`/`avg_loss` (and
//! therefore `rsi`) are defined at every index, matching the no-warmup-NaN
//! shape of the underlying `ema_of_series`.

use super::ema::ema_of_series;

/// Per-candle gain/loss series: `gain[i] = max(close[i]-close[i-1], 0)`,
/// `loss[i] = max(close[i-1]-close[i], 0)`, both `0.0` at index 0.
pub fn gains_and_losses(close: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = close.len();
    let mut gain = vec![0.0; n];
    let mut loss = vec![0.0; n];
    for i in 1..n {
        let delta = close[i] - close[i - 1];
        gain[i] = delta.max(0.0);
        loss[i] = (-delta).max(0.0);
    }
    (gain, loss)
}

/// RSI over `period`. Output column name is `rsi<period>` (§4.2), except
/// when the indicator engine requests it under the bare name `rsi` for
/// `stoch_rsi`'s implicit dependency.
pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
    let (gain, loss) = gains_and_losses(close);
    let avg_gain = ema_of_series(&gain, period);
    let avg_loss = ema_of_series(&loss, period);

    let n = close.len();
    let mut result = vec![f64::NAN; n];
    for i in 0..n {
        if avg_gain[i].is_nan() || avg_loss[i].is_nan() {
            continue;
        }
        result[i] = if avg_loss[i] == 0.0 {
            100.0
        } else {
            let rs = avg_gain[i] / avg_loss[i];
            100.0 - 100.0 / (1.0 + rs)
        };
    }
    result
}
