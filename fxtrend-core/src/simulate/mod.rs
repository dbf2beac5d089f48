//! Trade Simulator (§4.6): the batch, array-based exit-evaluation loop
//! shared by the per-symbol runner and the portfolio scheduler so both
//! produce identical outcomes.
//!
//! Grounded on `original_source/src/backtest/execution.py`'s entry-fill /
//! exit-precedence / trailing-stop-timeout logic, re-expressed over plain
//! `high`/`low`/`close` arrays per spec.md §4.6 instead of a `Candle`
//! sequence plus per-trade object.

use chrono::{DateTime, Utc};

use crate::domain::{Direction, ExitReason, TradeExecution};
use crate::error::ExecutionError;

/// One trade's simulation inputs (§4.6). `initial_stop_price`/`target_price`
/// are absolute prices (as produced by the scanner's entry pricing, §4.4) —
/// spec.md's "stop_loss_pct"/"take_profit_pct" naming is read as the
/// already-resolved price levels carried on `TradeSignal`, since the
/// simulator's batch interface operates purely on price arrays with no
/// percent-of-equity context available to it.
#[derive(Debug, Clone)]
pub struct TradeEntry {
    pub signal_id: String,
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_price: f64,
    pub initial_stop_price: f64,
    pub target_price: f64,
    pub trailing_stop_timeout_candles: Option<usize>,
    pub slippage_pips: f64,
    pub spread_pips: f64,
    pub commission_per_lot: f64,
    pub position_size: f64,
    pub pip_value: f64,
}

fn slippage(entry: &TradeEntry) -> f64 {
    entry.slippage_pips * entry.pip_value
}

/// Simulates one trade to exit. Returns `Err` (§7 `ExecutionSimulationError`)
/// when `entry_price == initial_stop_price` — the caller skips the trade
/// and continues (§7 recovery policy), it does not propagate.
pub fn simulate_trade(
    entry: &TradeEntry,
    high: &[f64],
    low: &[f64],
    close: &[f64],
    timestamp_utc: &[DateTime<Utc>],
) -> Result<TradeExecution, ExecutionError> {
    if entry.entry_price == entry.initial_stop_price {
        return Err(ExecutionError::InvalidEntry {
            signal_id: entry.signal_id.clone(),
        });
    }

    let risk_distance = (entry.entry_price - entry.initial_stop_price).abs();
    let slip = slippage(entry);
    let n = close.len();

    let mut trailing_active = false;
    let mut stop_price = entry.initial_stop_price;
    let mut candles_in_trade = 0usize;
    let mut mae_r: Option<f64> = None;
    let mut mfe_r: Option<f64> = None;

    for i in (entry.entry_index + 1)..n {
        candles_in_trade += 1;

        if let Some(timeout) = entry.trailing_stop_timeout_candles {
            if candles_in_trade >= timeout {
                trailing_active = true;
            }
        }
        if trailing_active {
            stop_price = match entry.direction {
                Direction::Long => stop_price.max(close[i] - risk_distance),
                Direction::Short => stop_price.min(close[i] + risk_distance),
            };
        }

        // track MAE/MFE in R-multiples while the trade is open (§11.1)
        let excursion_r = match entry.direction {
            Direction::Long => (low[i] - entry.entry_price) / risk_distance,
            Direction::Short => (entry.entry_price - high[i]) / risk_distance,
        };
        mae_r = Some(mae_r.map_or(excursion_r, |m: f64| m.min(excursion_r)));
        let favorable_r = match entry.direction {
            Direction::Long => (high[i] - entry.entry_price) / risk_distance,
            Direction::Short => (entry.entry_price - low[i]) / risk_distance,
        };
        mfe_r = Some(mfe_r.map_or(favorable_r, |m: f64| m.max(favorable_r)));

        let exit = match entry.direction {
            Direction::Long => {
                if low[i] <= stop_price {
                    let reason = if trailing_active {
                        ExitReason::TrailingStop
                    } else {
                        ExitReason::StopLoss
                    };
                    Some((stop_price - slip, reason))
                } else if high[i] >= entry.target_price {
                    Some((entry.target_price - slip, ExitReason::Target))
                } else {
                    None
                }
            }
            Direction::Short => {
                if high[i] >= stop_price {
                    let reason = if trailing_active {
                        ExitReason::TrailingStop
                    } else {
                        ExitReason::StopLoss
                    };
                    Some((stop_price + slip, reason))
                } else if low[i] <= entry.target_price {
                    Some((entry.target_price + slip, ExitReason::Target))
                } else {
                    None
                }
            }
        };

        if let Some((exit_price, exit_reason)) = exit {
            return Ok(build_execution(
                entry,
                exit_price,
                exit_reason,
                timestamp_utc[i],
                risk_distance,
                mae_r,
                mfe_r,
            ));
        }
    }

    // No exit found by end of data.
    let last = n - 1;
    Ok(build_execution(
        entry,
        close[last],
        ExitReason::EndOfData,
        timestamp_utc[last],
        risk_distance,
        mae_r,
        mfe_r,
    ))
}

#[allow(clippy::too_many_arguments)]
fn build_execution(
    entry: &TradeEntry,
    exit_price: f64,
    exit_reason: ExitReason,
    close_timestamp: DateTime<Utc>,
    risk_distance: f64,
    mae_r: Option<f64>,
    mfe_r: Option<f64>,
) -> TradeExecution {
    let pnl_distance = match entry.direction {
        Direction::Long => exit_price - entry.entry_price,
        Direction::Short => entry.entry_price - exit_price,
    };
    let pnl_r = pnl_distance / risk_distance;
    let total_costs =
        entry.spread_pips * entry.pip_value + entry.commission_per_lot * entry.position_size;

    TradeExecution {
        signal_id: entry.signal_id.clone(),
        direction: entry.direction,
        open_timestamp: close_timestamp, // overwritten by caller with the true entry timestamp
        entry_fill_price: entry.entry_price,
        close_timestamp,
        exit_fill_price: exit_price,
        exit_reason,
        pnl_r,
        slippage_entry_pips: entry.slippage_pips,
        slippage_exit_pips: entry.slippage_pips,
        costs_total: total_costs,
        mae_r,
        mfe_r,
    }
}

/// Batch variant (§4.6): one simulation per entry, sharing one set of
/// price/time arrays. Entries that fail with `InvalidEntry` are skipped and
/// logged (§7) rather than aborting the batch.
pub fn simulate_batch(
    entries: &[TradeEntry],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    timestamp_utc: &[DateTime<Utc>],
) -> Vec<TradeExecution> {
    entries
        .iter()
        .filter_map(|entry| {
            let mut exec = match simulate_trade(entry, high, low, close, timestamp_utc) {
                Ok(exec) => exec,
                Err(err) => {
                    tracing::warn!(signal_id = %entry.signal_id, error = %err, "skipping invalid trade entry");
                    return None;
                }
            };
            exec.open_timestamp = timestamp_utc[entry.entry_index];
            Some(exec)
        })
        .collect()
}
