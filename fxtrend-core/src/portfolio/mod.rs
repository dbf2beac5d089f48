//! Portfolio Scheduler (§4.7): per-symbol vectorized simulation, merged
//! chronologically against a single shared equity balance.
//!
//! Grounded on
//! `original_source/src/backtest/portfolio/portfolio_simulator.py`'s
//! three-phase `simulate()` — per-symbol batch sim, sort-by-exit-timestamp
//! merge, then a single forward pass that re-prices each trade against
//! `current_equity` at the moment it is visited.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CandleTable, ClosedTrade, Direction, ExitReason, TradeSignal};
use crate::signals::concurrency::filter_concurrent;
use crate::simulate::{simulate_batch, TradeEntry};

/// Per-symbol aggregate, emitted alongside the merged trade list (§4.7 step 5).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SymbolBreakdown {
    pub trade_count: u64,
    pub win_count: u64,
    pub loss_count: u64,
    pub win_rate: f64,
    pub total_r: f64,
    pub avg_r: f64,
    pub total_pnl: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioResult {
    pub run_id: String,
    pub direction_mode: String,
    pub starting_equity: f64,
    pub final_equity: f64,
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
    pub closed_trades: Vec<ClosedTrade>,
    pub total_trades: u64,
    pub total_pnl: f64,
    pub per_symbol_trades: BTreeMap<String, SymbolBreakdown>,
    pub symbols: Vec<String>,
    pub timeframe: String,
    pub data_start_date: DateTime<Utc>,
    pub data_end_date: DateTime<Utc>,
}

/// Position-sizing policy for the shared-equity re-pricing pass (§4.7 step 3).
pub struct PortfolioParams {
    pub starting_equity: f64,
    pub risk_per_trade: f64,
    pub max_positions_per_symbol: i64,
    pub run_id: String,
    pub direction_mode: String,
    pub timeframe: String,
}

impl Default for PortfolioParams {
    fn default() -> Self {
        Self {
            starting_equity: 2500.0,
            risk_per_trade: 0.0025,
            max_positions_per_symbol: 1,
            run_id: "portfolio_run".to_string(),
            direction_mode: "BOTH".to_string(),
            timeframe: "1m".to_string(),
        }
    }
}

fn simulate_symbol(
    symbol: &str,
    table: &CandleTable,
    signals: &[TradeSignal],
    max_concurrent: i64,
) -> Vec<ClosedTrade> {
    if signals.is_empty() {
        return Vec::new();
    }

    let ts_index: HashMap<DateTime<Utc>, usize> = table
        .timestamp_utc
        .iter()
        .enumerate()
        .map(|(i, &ts)| (ts, i))
        .collect();

    let mut entries: Vec<TradeEntry> = Vec::new();
    for signal in signals {
        let Some(&idx) = ts_index.get(&signal.timestamp_utc) else {
            continue;
        };
        entries.push(TradeEntry {
            signal_id: signal.id.clone(),
            direction: signal.direction,
            entry_index: idx,
            entry_price: signal.entry_price,
            initial_stop_price: signal.initial_stop_price,
            target_price: signal.target_price,
            trailing_stop_timeout_candles: None,
            slippage_pips: 0.5,
            spread_pips: 1.0,
            commission_per_lot: 7.0,
            position_size: signal.calc_position_size,
            pip_value: 0.0001,
        });
    }
    if entries.is_empty() {
        return Vec::new();
    }

    // One open position per symbol at a time (default max_concurrent=1, §4.7).
    let entry_idx: Vec<usize> = entries.iter().map(|e| e.entry_index).collect();
    let provisional = simulate_batch(
        &entries,
        &table.high,
        &table.low,
        &table.close,
        &table.timestamp_utc,
    );
    let exit_ts_index: HashMap<&str, DateTime<Utc>> = provisional
        .iter()
        .map(|e| (e.signal_id.as_str(), e.close_timestamp))
        .collect();
    let exit_idx: Vec<usize> = entries
        .iter()
        .map(|e| {
            exit_ts_index
                .get(e.signal_id.as_str())
                .and_then(|ts| ts_index.get(ts))
                .copied()
                .unwrap_or(usize::MAX)
        })
        .collect();
    let admitted = filter_concurrent(&entry_idx, &exit_idx, max_concurrent);

    provisional
        .into_iter()
        .zip(admitted)
        .filter(|(_, keep)| *keep)
        .map(|(exec, _)| ClosedTrade {
            symbol: symbol.to_string(),
            signal_id: exec.signal_id,
            direction: exec.direction,
            entry_timestamp: exec.open_timestamp,
            exit_timestamp: exec.close_timestamp,
            entry_price: exec.entry_fill_price,
            exit_price: exec.exit_fill_price,
            exit_reason: exec.exit_reason,
            pnl_r: exec.pnl_r,
            risk_amount: None,
            pnl_dollars: None,
            mae_r: exec.mae_r,
            mfe_r: exec.mfe_r,
        })
        .collect()
}

/// Runs the full portfolio simulation (§4.7).
pub fn simulate_portfolio(
    symbol_data: &BTreeMap<String, CandleTable>,
    symbol_signals: &BTreeMap<String, Vec<TradeSignal>>,
    params: &PortfolioParams,
) -> PortfolioResult {
    let mut all_trades: Vec<ClosedTrade> = Vec::new();
    for (symbol, signals) in symbol_signals {
        let Some(table) = symbol_data.get(symbol) else {
            continue;
        };
        all_trades.extend(simulate_symbol(
            symbol,
            table,
            signals,
            params.max_positions_per_symbol,
        ));
    }

    // Stable sort by exit_timestamp, tie-break (symbol, signal_id) (§4.7 step 2, §5).
    all_trades.sort_by(|a, b| {
        a.exit_timestamp
            .cmp(&b.exit_timestamp)
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.signal_id.cmp(&b.signal_id))
    });

    let data_start = symbol_data
        .values()
        .filter_map(|t| t.timestamp_utc.first().copied())
        .min()
        .unwrap_or_else(Utc::now);
    let data_end = symbol_data
        .values()
        .filter_map(|t| t.timestamp_utc.last().copied())
        .max()
        .unwrap_or_else(Utc::now);

    let mut current_equity = params.starting_equity;
    let mut equity_curve = vec![(data_start, current_equity)];

    for trade in all_trades.iter_mut() {
        let risk_amount = current_equity * params.risk_per_trade;
        let pnl_dollars = trade.pnl_r * risk_amount;
        current_equity += pnl_dollars;
        trade.risk_amount = Some(risk_amount);
        trade.pnl_dollars = Some(pnl_dollars);
        equity_curve.push((trade.exit_timestamp, current_equity));
    }
    equity_curve.push((data_end, current_equity));

    let mut per_symbol_trades: BTreeMap<String, SymbolBreakdown> = BTreeMap::new();
    for trade in &all_trades {
        let entry = per_symbol_trades.entry(trade.symbol.clone()).or_default();
        entry.trade_count += 1;
        entry.total_pnl += trade.pnl_dollars.unwrap_or(0.0);
        entry.total_r += trade.pnl_r;
        if trade.pnl_r > 0.0 {
            entry.win_count += 1;
        } else {
            entry.loss_count += 1;
        }
    }
    for stats in per_symbol_trades.values_mut() {
        let tc = stats.trade_count as f64;
        stats.win_rate = if tc > 0.0 {
            stats.win_count as f64 / tc
        } else {
            0.0
        };
        stats.avg_r = if tc > 0.0 { stats.total_r / tc } else { 0.0 };
    }

    let total_trades = all_trades.len() as u64;
    let total_pnl = current_equity - params.starting_equity;

    PortfolioResult {
        run_id: params.run_id.clone(),
        direction_mode: params.direction_mode.clone(),
        starting_equity: params.starting_equity,
        final_equity: current_equity,
        equity_curve,
        closed_trades: all_trades,
        total_trades,
        total_pnl,
        per_symbol_trades,
        symbols: symbol_data.keys().cloned().collect(),
        timeframe: params.timeframe.clone(),
        data_start_date: data_start,
        data_end_date: data_end,
    }
}
