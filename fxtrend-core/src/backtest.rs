//! Component F: per-symbol orchestration wiring the indicator engine,
//! blackout filter, signal scanner, concurrency filter, and simulator into
//! one backtest run over a single symbol's candle table.
//!
//! Grounded on `original_source/src/backtest/orchestrator.py`'s top-level
//! `run_backtest` sequencing — enrich, filter, scan, filter, simulate — with
//! every stage delegating to the dedicated module that owns its algorithm.

use chrono::{NaiveDate, Utc};

use crate::blackout::{self, BlackoutConfig};
use crate::config::StrategyConfig;
use crate::domain::{BacktestRun, BlackoutWindow, Candle, CandleTable, ClosedTrade, MetricsSummary};
use crate::error::EngineError;
use crate::identity::{compute_parameters_hash, ReproducibilityTracker};
use crate::indicators;
use crate::metrics;
use crate::signals::{self, concurrency::filter_concurrent, DirectionMode};
use crate::simulate::{simulate_batch, TradeEntry};

/// The fixed indicator set the scanner requires, parameterized by `config`
/// (§4.4's required columns: `ema<fast>`, `ema<slow>`, `rsi<length>`,
/// `stoch_rsi`, `atr<length>`).
fn required_indicator_specs(config: &StrategyConfig) -> Vec<String> {
    vec![
        format!("ema{}", config.ema_fast),
        format!("ema{}", config.ema_slow),
        format!("rsi{}", config.rsi_length),
        format!("stoch_rsi({})", config.rsi_length),
        format!("atr{}", config.atr_length),
    ]
}

/// Result of a single-symbol backtest: closed trades, the final merged
/// blackout window set, and the run record (§3's `BacktestRun`).
pub struct SingleSymbolResult {
    pub run: BacktestRun,
    pub closed_trades: Vec<ClosedTrade>,
    pub metrics: MetricsSummary,
    pub blackout_windows: Vec<BlackoutWindow>,
}

/// Runs one symbol end-to-end: enrich with indicators, compute blackout
/// windows, scan for signals, drop any signal inside a blackout, apply the
/// concurrency filter, simulate to exit, and summarize.
pub fn run_single_symbol(
    pair: &str,
    candles: &[Candle],
    config: &StrategyConfig,
    blackout_config: &BlackoutConfig,
    direction_mode: DirectionMode,
    run_id: &str,
) -> Result<SingleSymbolResult, EngineError> {
    config.validate()?;

    let mut table = CandleTable::from_candles(candles);
    table.validate().map_err(|e| match e {
        crate::domain::CandleTableError::Empty => crate::error::IngestionError::Empty,
        crate::domain::CandleTableError::NonMonotonicTimestamp { index, .. } => {
            crate::error::IngestionError::NonMonotonicTimestamp { index }
        }
        crate::domain::CandleTableError::InvalidOhlc { index } => {
            crate::error::IngestionError::InvalidOhlc { index }
        }
    })?;

    let specs = required_indicator_specs(config);
    indicators::apply_specs(&mut table, &specs);

    let params_map: std::collections::BTreeMap<String, String> = [
        ("ema_fast".to_string(), config.ema_fast.to_string()),
        ("ema_slow".to_string(), config.ema_slow.to_string()),
        ("rsi_length".to_string(), config.rsi_length.to_string()),
        ("atr_length".to_string(), config.atr_length.to_string()),
    ]
    .into_iter()
    .collect();
    let params_hash = compute_parameters_hash(&params_map);

    let mut tracker = ReproducibilityTracker::new(&params_hash.as_hex(), pair, env!("CARGO_PKG_VERSION"));

    let start_date: NaiveDate = table
        .timestamp_utc
        .first()
        .map(|ts| ts.date_naive())
        .unwrap_or_else(|| Utc::now().date_naive());
    let end_date: NaiveDate = table
        .timestamp_utc
        .last()
        .map(|ts| ts.date_naive())
        .unwrap_or(start_date);
    let blackout_windows = blackout::build_windows(start_date, end_date, blackout_config)?;

    let mut signal_list = signals::scan(&table, config, pair, direction_mode, &params_hash);

    let indices: Vec<usize> = (0..signal_list.len()).collect();
    let timestamps: Vec<_> = signal_list.iter().map(|s| s.timestamp_utc).collect();
    let (kept_indices, _blocked) =
        blackout::filter_blacked_out(&indices, &timestamps, &blackout_windows);
    let kept: std::collections::HashSet<usize> = kept_indices.into_iter().collect();
    let mut i = 0usize;
    signal_list.retain(|_| {
        let keep = kept.contains(&i);
        i += 1;
        keep
    });

    for signal in &signal_list {
        tracker.add_event("SIGNAL_GENERATED", &signal.id);
    }

    let ts_index: std::collections::HashMap<_, _> = table
        .timestamp_utc
        .iter()
        .enumerate()
        .map(|(i, &ts)| (ts, i))
        .collect();
    let mut entries: Vec<TradeEntry> = Vec::new();
    for signal in &signal_list {
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

    let provisional = simulate_batch(
        &entries,
        &table.high,
        &table.low,
        &table.close,
        &table.timestamp_utc,
    );
    let exit_ts_by_signal: std::collections::HashMap<&str, _> = provisional
        .iter()
        .map(|e| (e.signal_id.as_str(), e.close_timestamp))
        .collect();
    let entry_idx: Vec<usize> = entries.iter().map(|e| e.entry_index).collect();
    let exit_idx: Vec<usize> = entries
        .iter()
        .map(|e| {
            exit_ts_by_signal
                .get(e.signal_id.as_str())
                .and_then(|ts| ts_index.get(ts))
                .copied()
                .unwrap_or(usize::MAX)
        })
        .collect();
    let admitted = filter_concurrent(&entry_idx, &exit_idx, 1);

    let closed_trades: Vec<ClosedTrade> = provisional
        .into_iter()
        .zip(admitted)
        .filter(|(_, keep)| *keep)
        .map(|(exec, _)| {
            tracker.add_event("TRADE_CLOSED", &exec.signal_id);
            ClosedTrade {
                symbol: pair.to_string(),
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
            }
        })
        .collect();

    let summary = metrics::summarize(&closed_trades);

    tracker.update_candle_count(table.len() as u64);
    let reproducibility_hash = tracker.finalize();

    let now = Utc::now();
    let run = BacktestRun {
        run_id: run_id.to_string(),
        parameters_hash: params_hash.as_hex(),
        manifest_ref: pair.to_string(),
        start_time: now,
        end_time: now,
        total_candles_processed: table.len() as u64,
        reproducibility_hash,
    };

    Ok(SingleSymbolResult {
        run,
        closed_trades,
        metrics: summary,
        blackout_windows,
    })
}
