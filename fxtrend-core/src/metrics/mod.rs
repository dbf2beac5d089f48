//! Metrics & Drawdown (§4.8): aggregate R-multiples into summary
//! statistics, a drawdown curve, drawdown periods, and recovery time.
//!
//! Grounded on `original_source/src/backtest/metrics.py`'s expectancy /
//! Sharpe / profit-factor / drawdown formulas, re-expressed over a plain
//! `&[f64]` of `pnl_r` values (and a parallel duration array) so the same
//! functions serve both per-symbol and portfolio trade lists.

use chrono::{DateTime, Utc};

use crate::domain::{ClosedTrade, MetricsSummary};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 divisor), matching §4.8's `sharpe_estimate`.
fn sample_stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

fn downside_semideviation(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let downside: Vec<f64> = values.iter().copied().filter(|&v| v < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    let variance = downside.iter().map(|v| v.powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

fn longest_run(values: &[f64], predicate: impl Fn(f64) -> bool) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for &v in values {
        if predicate(v) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Computes the full summary over an ordered trade list (§4.8).
pub fn summarize(trades: &[ClosedTrade]) -> MetricsSummary {
    let trade_count = trades.len() as u64;
    let pnl_r: Vec<f64> = trades.iter().map(|t| t.pnl_r).collect();

    let win_count = pnl_r.iter().filter(|&&r| r > 0.0).count() as u64;
    let loss_count = pnl_r.iter().filter(|&&r| r < 0.0).count() as u64;
    let breakeven_count = trade_count - win_count - loss_count;

    let win_rate = if trade_count == 0 {
        f64::NAN
    } else {
        win_count as f64 / trade_count as f64
    };

    let wins: Vec<f64> = pnl_r.iter().copied().filter(|&r| r > 0.0).collect();
    let losses: Vec<f64> = pnl_r.iter().copied().filter(|&r| r < 0.0).collect();
    let avg_win_r = if wins.is_empty() { f64::NAN } else { mean(&wins) };
    let avg_loss_r = if losses.is_empty() {
        f64::NAN
    } else {
        mean(&losses)
    };
    let avg_r = if pnl_r.is_empty() { f64::NAN } else { mean(&pnl_r) };

    let sharpe_estimate = if pnl_r.len() < 2 {
        f64::NAN
    } else {
        let sd = sample_stdev(&pnl_r);
        if sd == 0.0 { f64::NAN } else { mean(&pnl_r) / sd }
    };
    let sortino_ratio = if pnl_r.len() < 2 {
        f64::NAN
    } else {
        let sd = downside_semideviation(&pnl_r);
        if sd == 0.0 { f64::NAN } else { mean(&pnl_r) / sd }
    };

    let gross_win: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if wins.is_empty() && losses.is_empty() {
        f64::NAN
    } else if gross_loss == 0.0 {
        f64::INFINITY
    } else {
        gross_win / gross_loss
    };

    let max_drawdown_r = max_drawdown(&pnl_r);
    let max_consecutive_wins = longest_run(&pnl_r, |r| r > 0.0);
    let max_consecutive_losses = longest_run(&pnl_r, |r| r < 0.0);

    let avg_trade_duration_seconds = if trades.is_empty() {
        f64::NAN
    } else {
        mean(
            &trades
                .iter()
                .map(|t| t.duration_seconds() as f64)
                .collect::<Vec<_>>(),
        )
    };

    MetricsSummary {
        trade_count,
        win_count,
        loss_count,
        breakeven_count,
        win_rate,
        avg_win_r,
        avg_loss_r,
        avg_r,
        expectancy: avg_r,
        sharpe_estimate,
        sortino_ratio,
        profit_factor,
        max_drawdown_r,
        max_consecutive_wins,
        max_consecutive_losses,
        avg_trade_duration_seconds,
        latency_p95_ms: None,
        latency_mean_ms: None,
    }
}

fn cumulative_pnl(pnl_r: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(pnl_r.len());
    let mut running = 0.0;
    for &r in pnl_r {
        running += r;
        curve.push(running);
    }
    curve
}

/// `min(drawdown)` over the cumulative-PnL curve, 0.0 when no trades (§4.8).
pub fn max_drawdown(pnl_r: &[f64]) -> f64 {
    if pnl_r.is_empty() {
        return 0.0;
    }
    let curve = cumulative_pnl(pnl_r);
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0;
    for &c in &curve {
        peak = peak.max(c);
        worst = worst.min(c - peak);
    }
    worst
}

/// The running drawdown series (`C - cummax(C)`) in R-multiples.
pub fn drawdown_curve(pnl_r: &[f64]) -> Vec<f64> {
    let curve = cumulative_pnl(pnl_r);
    let mut peak = f64::NEG_INFINITY;
    curve
        .iter()
        .map(|&c| {
            peak = peak.max(c);
            c - peak
        })
        .collect()
}

/// One closed interval where equity is below its prior peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownPeriod {
    pub start_idx: usize,
    pub end_idx: usize,
    pub magnitude: f64,
}

/// Drawdown periods `(start_idx, end_idx, magnitude)`, each ending when a
/// new equity peak is reached (§4.8).
pub fn drawdown_periods(pnl_r: &[f64]) -> Vec<DrawdownPeriod> {
    let dd = drawdown_curve(pnl_r);
    let mut periods = Vec::new();
    let mut start: Option<usize> = None;
    let mut worst = 0.0;

    for (i, &d) in dd.iter().enumerate() {
        if d < 0.0 {
            if start.is_none() {
                start = Some(i);
                worst = d;
            } else {
                worst = worst.min(d);
            }
        } else if let Some(s) = start.take() {
            periods.push(DrawdownPeriod {
                start_idx: s,
                end_idx: i,
                magnitude: worst,
            });
        }
    }
    if let Some(s) = start {
        periods.push(DrawdownPeriod {
            start_idx: s,
            end_idx: dd.len() - 1,
            magnitude: worst,
        });
    }
    periods
}

/// Candles from drawdown start until equity reaches the pre-drawdown peak;
/// `0` if the drawdown never recovers within the series (§4.8).
pub fn recovery_time(pnl_r: &[f64]) -> Vec<u32> {
    let dd = drawdown_curve(pnl_r);
    let periods = drawdown_periods(pnl_r);
    periods
        .iter()
        .map(|p| {
            if dd[p.end_idx] >= 0.0 {
                (p.end_idx - p.start_idx) as u32
            } else {
                0
            }
        })
        .collect()
}
