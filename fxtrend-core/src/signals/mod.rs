//! Signal Scanner (§4.4): trend classification, pullback activation,
//! momentum-turn and candlestick-pattern confirmation, and entry pricing
//! for the trend-pullback-continuation strategy.
//!
//! Grounded on
//! `original_source/src/strategy/trend_pullback/signal_generator_vectorized.py`,
//! re-expressed over plain `&[f64]` columns instead of Polars expressions —
//! the same rolling/shift/mask operations, just hand-rolled loops.

pub mod concurrency;

use chrono::{DateTime, Utc};

use crate::config::StrategyConfig;
use crate::domain::{CandleTable, Direction, ParamsHash, TradeSignal};
use crate::identity::generate_signal_id;

/// Direction mode the scanner is asked to run in (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionMode {
    Long,
    Short,
    Both,
}

/// Per-row trend classification (§4.4). `+1` UP, `-1` DOWN, `0` RANGE —
/// RANGE also applies whenever the rolling count of EMA-relationship flips
/// in the last 50 rows reaches `cross_count_threshold`, even if the current
/// relationship is directional.
pub fn trend_state(ema_fast: &[f64], ema_slow: &[f64], cross_count_threshold: u32) -> Vec<i8> {
    let n = ema_fast.len();
    let mut above = vec![false; n];
    for i in 0..n {
        above[i] = ema_fast[i] > ema_slow[i];
    }
    let mut crossovers = vec![0u8; n];
    for i in 1..n {
        if above[i] != above[i - 1] {
            crossovers[i] = 1;
        }
    }
    const WINDOW: usize = 50;
    let mut state = vec![0i8; n];
    for i in 0..n {
        let start = i.saturating_sub(WINDOW - 1);
        let rolling_crosses: u32 = crossovers[start..=i].iter().map(|&c| c as u32).sum();
        state[i] = if rolling_crosses >= cross_count_threshold {
            0
        } else if ema_fast[i] > ema_slow[i] {
            1
        } else if ema_fast[i] < ema_slow[i] {
            -1
        } else {
            0
        };
    }
    state
}

/// Rolling-max propagation of a one-bar "oscillator extreme" condition over
/// `pullback_max_age` rows, gated on the trend still holding at the current
/// row (§4.4).
fn pullback_active(
    trend_state: &[i8],
    is_extreme: &[bool],
    pullback_max_age: usize,
    wanted_trend: i8,
) -> Vec<bool> {
    let n = trend_state.len();
    let mut active = vec![false; n];
    for i in 0..n {
        let start = i.saturating_sub(pullback_max_age.max(1) - 1);
        let any_extreme = is_extreme[start..=i].iter().any(|&e| e);
        active[i] = any_extreme && trend_state[i] == wanted_trend;
    }
    active
}

fn is_bullish_engulfing(
    prev_open: f64,
    prev_close: f64,
    curr_open: f64,
    curr_close: f64,
) -> bool {
    prev_close < prev_open
        && curr_close > curr_open
        && curr_open < prev_close
        && curr_close > prev_open
}

fn is_bearish_engulfing(
    prev_open: f64,
    prev_close: f64,
    curr_open: f64,
    curr_close: f64,
) -> bool {
    prev_close > prev_open
        && curr_close < curr_open
        && curr_open > prev_close
        && curr_close < prev_open
}

fn is_hammer(open: f64, high: f64, low: f64, close: f64) -> bool {
    let body = (close - open).abs();
    let upper_wick = high - open.max(close);
    let lower_wick = open.min(close) - low;
    body > 0.0 && lower_wick >= 2.0 * body && upper_wick < 0.5 * body
}

fn is_shooting_star(open: f64, high: f64, low: f64, close: f64) -> bool {
    let body = (close - open).abs();
    let upper_wick = high - open.max(close);
    let lower_wick = open.min(close) - low;
    body > 0.0 && upper_wick >= 2.0 * body && lower_wick < 0.5 * body
}

/// Scans a fully-enriched candle table and emits the ordered list of
/// signals for `direction_mode`, per §4.4. The table must already carry
/// `ema<fast>`, `ema<slow>`, `rsi<length>`, `stoch_rsi`, `atr<length>`
/// columns (the indicator engine's job, §4.2).
#[allow(clippy::too_many_arguments)]
pub fn scan(
    table: &CandleTable,
    config: &StrategyConfig,
    pair: &str,
    direction_mode: DirectionMode,
    params_hash: &ParamsHash,
) -> Vec<TradeSignal> {
    let n = table.len();
    if n == 0 {
        return Vec::new();
    }

    let ema_fast_col = format!("ema{}", config.ema_fast);
    let ema_slow_col = format!("ema{}", config.ema_slow);
    let rsi_col = format!("rsi{}", config.rsi_length);
    let atr_col = format!("atr{}", config.atr_length);

    let (Some(ema_fast), Some(ema_slow), Some(rsi), Some(stoch_rsi)) = (
        table.column(&ema_fast_col),
        table.column(&ema_slow_col),
        table.column(&rsi_col),
        table.column("stoch_rsi"),
    ) else {
        return Vec::new();
    };
    let atr = table.column(&atr_col);

    let state = trend_state(ema_fast, ema_slow, config.trend_cross_count_threshold);

    let mut signals = Vec::new();
    if matches!(direction_mode, DirectionMode::Long | DirectionMode::Both) {
        signals.extend(scan_direction(
            table,
            config,
            pair,
            params_hash,
            &state,
            rsi,
            stoch_rsi,
            atr,
            Direction::Long,
        ));
    }
    if matches!(direction_mode, DirectionMode::Short | DirectionMode::Both) {
        signals.extend(scan_direction(
            table,
            config,
            pair,
            params_hash,
            &state,
            rsi,
            stoch_rsi,
            atr,
            Direction::Short,
        ));
    }
    signals.sort_by_key(|s| s.timestamp_utc);
    signals
}

#[allow(clippy::too_many_arguments)]
fn scan_direction(
    table: &CandleTable,
    config: &StrategyConfig,
    pair: &str,
    params_hash: &ParamsHash,
    state: &[i8],
    rsi: &[f64],
    stoch_rsi: &[f64],
    atr: Option<&[f64]>,
    direction: Direction,
) -> Vec<TradeSignal> {
    let n = table.len();
    let wanted_trend: i8 = if direction == Direction::Long { 1 } else { -1 };

    let is_extreme: Vec<bool> = (0..n)
        .map(|i| {
            if state[i] != wanted_trend {
                return false;
            }
            match direction {
                Direction::Long => rsi[i] < config.rsi_oversold || stoch_rsi[i] < config.stoch_rsi_low,
                Direction::Short => {
                    rsi[i] > config.rsi_overbought || stoch_rsi[i] > config.stoch_rsi_high
                }
            }
        })
        .collect();

    let active = pullback_active(
        state,
        &is_extreme,
        config.pullback_max_age as usize,
        wanted_trend,
    );

    let mut signals = Vec::new();
    for i in 1..n {
        if !active[i] {
            continue;
        }
        let momentum_turn = match direction {
            Direction::Long => {
                (rsi[i - 1] < 40.0 && rsi[i] > rsi[i - 1])
                    || (stoch_rsi[i - 1] < 0.3 && stoch_rsi[i] > stoch_rsi[i - 1])
            }
            Direction::Short => {
                (rsi[i - 1] > 60.0 && rsi[i] < rsi[i - 1])
                    || (stoch_rsi[i - 1] > 0.7 && stoch_rsi[i] < stoch_rsi[i - 1])
            }
        };
        if !momentum_turn {
            continue;
        }

        let has_pattern = match direction {
            Direction::Long => {
                is_bullish_engulfing(
                    table.open[i - 1],
                    table.close[i - 1],
                    table.open[i],
                    table.close[i],
                ) || is_hammer(table.open[i], table.high[i], table.low[i], table.close[i])
            }
            Direction::Short => {
                is_bearish_engulfing(
                    table.open[i - 1],
                    table.close[i - 1],
                    table.open[i],
                    table.close[i],
                ) || is_shooting_star(table.open[i], table.high[i], table.low[i], table.close[i])
            }
        };
        if !has_pattern {
            continue;
        }

        let entry_price = table.close[i];
        let atr_val = atr
            .map(|a| a[i])
            .filter(|v| !v.is_nan())
            .unwrap_or(0.002);
        let stop_distance = atr_val * config.atr_stop_mult;
        let (stop_price, target_price) = match direction {
            Direction::Long => (
                entry_price - stop_distance,
                entry_price + stop_distance * config.target_r_mult,
            ),
            Direction::Short => (
                entry_price + stop_distance,
                entry_price - stop_distance * config.target_r_mult,
            ),
        };

        let timestamp_utc: DateTime<Utc> = table.timestamp_utc[i];
        let position_size = 0.01;
        let id = generate_signal_id(
            pair,
            timestamp_utc,
            direction,
            entry_price,
            stop_price,
            position_size,
            &params_hash.as_hex(),
        );

        signals.push(TradeSignal {
            id,
            pair: pair.to_string(),
            direction,
            timestamp_utc,
            entry_price,
            initial_stop_price: stop_price,
            target_price,
            risk_per_trade_pct: config.risk_per_trade_pct,
            calc_position_size: position_size,
            tags: vec!["pullback".to_string(), "reversal".to_string(), direction.as_tag().to_string()],
            version: env!("CARGO_PKG_VERSION").to_string(),
        });
    }
    signals
}
