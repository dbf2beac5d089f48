//! Worker body and sweep driver (§4.9 steps 3-4).
//!
//! Each worker builds one indicator-parameterized `StrategyConfig`, scans
//! every pair in the dataset for signals, and runs them through the
//! portfolio scheduler (`fxtrend_core::portfolio::simulate_portfolio`) so a
//! combination is scored on the same shared-equity basis a live sweep would
//! report. Grounded on `original_source/src/backtest/sweep.py`'s worker loop
//! and the teacher's `ParamSweep::sweep`/`sweep_with_progress` parallel /
//! sequential split (`src/sweep.rs`).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rayon::prelude::*;

use fxtrend_core::blackout::{self, BlackoutConfig};
use fxtrend_core::config::StrategyConfig;
use fxtrend_core::domain::{Candle, CandleTable};
use fxtrend_core::identity::compute_parameters_hash;
use fxtrend_core::indicators;
use fxtrend_core::metrics;
use fxtrend_core::portfolio::{simulate_portfolio, PortfolioParams};
use fxtrend_core::signals::{self, DirectionMode};

use crate::params::apply_parameter_set;
use crate::result::{rank_results, SingleResult, SweepResult};
use crate::sweep::{filter_invalid_combinations, generate_combinations, ParameterRange, ParameterSet};

/// The candle dataset a sweep runs against: one series per pair.
pub type Dataset = BTreeMap<String, Vec<Candle>>;

fn required_indicator_specs(config: &StrategyConfig) -> Vec<String> {
    vec![
        format!("ema{}", config.ema_fast),
        format!("ema{}", config.ema_slow),
        format!("rsi{}", config.rsi_length),
        format!("stoch_rsi({})", config.rsi_length),
        format!("atr{}", config.atr_length),
    ]
}

/// Runs one parameter combination's full backtest across every pair in
/// `dataset` and scores it. Never returns `Err` — any failure is captured
/// into `SingleResult.error` by the caller (§4.9 Failure semantics).
fn run_combination(
    params: ParameterSet,
    base_config: &StrategyConfig,
    dataset: &Dataset,
    blackout_config: &BlackoutConfig,
    direction_mode: DirectionMode,
) -> SingleResult {
    let config = apply_parameter_set(base_config, &params);
    if let Err(e) = config.validate() {
        return SingleResult::failed(params, e.to_string());
    }

    let specs = required_indicator_specs(&config);
    let mut symbol_data: BTreeMap<String, CandleTable> = BTreeMap::new();
    let mut symbol_signals: BTreeMap<String, Vec<_>> = BTreeMap::new();

    for (pair, candles) in dataset {
        let mut table = CandleTable::from_candles(candles);
        if let Err(e) = table.validate() {
            return SingleResult::failed(params, format!("{pair}: {e}"));
        }
        indicators::apply_specs(&mut table, &specs);

        let params_map: BTreeMap<String, String> = [
            ("ema_fast".to_string(), config.ema_fast.to_string()),
            ("ema_slow".to_string(), config.ema_slow.to_string()),
            ("rsi_length".to_string(), config.rsi_length.to_string()),
            ("atr_length".to_string(), config.atr_length.to_string()),
        ]
        .into_iter()
        .collect();
        let params_hash = compute_parameters_hash(&params_map);

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
        let blackout_windows = match blackout::build_windows(start_date, end_date, blackout_config)
        {
            Ok(w) => w,
            Err(e) => return SingleResult::failed(params, e.to_string()),
        };

        let mut signal_list = signals::scan(&table, &config, pair, direction_mode, &params_hash);
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

        symbol_data.insert(pair.clone(), table);
        symbol_signals.insert(pair.clone(), signal_list);
    }

    let portfolio_params = PortfolioParams {
        starting_equity: config.account_balance,
        risk_per_trade: config.risk_per_trade_pct / 100.0,
        ..PortfolioParams::default()
    };
    let portfolio = simulate_portfolio(&symbol_data, &symbol_signals, &portfolio_params);
    let summary = metrics::summarize(&portfolio.closed_trades);

    SingleResult {
        params,
        sharpe_ratio: summary.sharpe_estimate,
        total_pnl: portfolio.total_pnl,
        win_rate: summary.win_rate,
        trade_count: summary.trade_count,
        max_drawdown: summary.max_drawdown_r,
        error: None,
    }
}

/// Resolves the requested worker count against the machine's available
/// parallelism (§4.9 "parallelism = caller-supplied, default = available
/// cores, capped"). `None` means "use every available core".
fn resolve_thread_count(requested: Option<usize>) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.map(|n| n.clamp(1, available)).unwrap_or(available)
}

/// Runs the full sweep (§4.9): expand ranges, filter by constraint, fan out
/// to a worker pool sized to `max_parallelism` (or run sequentially when
/// `parallel` is `false`), and rank the successful results by
/// `ranking_metric`. `cancel`, when set, is checked between combinations —
/// never mid-simulation — and short-circuits any combination not yet
/// started into a failed placeholder result.
#[allow(clippy::too_many_arguments)]
pub fn run_sweep(
    ranges: &[ParameterRange],
    base_config: &StrategyConfig,
    dataset: &Dataset,
    blackout_config: &BlackoutConfig,
    direction_mode: DirectionMode,
    ranking_metric: &str,
    parallel: bool,
    max_parallelism: Option<usize>,
    cancel: Option<&AtomicBool>,
) -> SweepResult {
    let combinations = generate_combinations(ranges);
    let total_combinations = combinations.len();
    let (valid, skipped) = filter_invalid_combinations(combinations, &[]);
    if skipped > 0 {
        tracing::info!(skipped, "filtered invalid parameter combinations");
    }

    let run_one = |params: ParameterSet| {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            return SingleResult::failed(params, "sweep cancelled");
        }
        run_combination(params, base_config, dataset, blackout_config, direction_mode)
    };

    let start = Instant::now();
    let results: Vec<SingleResult> = if parallel {
        let thread_count = resolve_thread_count(max_parallelism);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .expect("failed to build sweep worker thread pool");
        pool.install(|| valid.into_par_iter().map(run_one).collect())
    } else {
        valid.into_iter().map(run_one).collect()
    };
    let execution_time_seconds = start.elapsed().as_secs_f64();

    let successful_count = results.iter().filter(|r| r.error.is_none()).count();
    let failed_count = results.len() - successful_count;
    let best_params = rank_results(&results, ranking_metric)
        .into_iter()
        .next()
        .map(|r| r.params.clone());

    SweepResult {
        results,
        best_params,
        ranking_metric: ranking_metric.to_string(),
        execution_time_seconds,
        total_combinations,
        successful_count,
        failed_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn trending_candles(n: usize) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let mut candles = Vec::with_capacity(n);
        let mut price = 1.1000;
        for i in 0..n {
            let ts = start + Duration::minutes(i as i64);
            price += 0.00005 * (1.0 + 0.2 * ((i % 7) as f64 - 3.0));
            let open = price;
            let close = price + 0.00003;
            let high = open.max(close) + 0.00002;
            let low = open.min(close) - 0.00002;
            candles.push(Candle::new(ts, open, high, low, close));
        }
        candles
    }

    fn dataset() -> Dataset {
        let mut d = BTreeMap::new();
        d.insert("EURUSD".to_string(), trending_candles(300));
        d
    }

    fn no_news_blackout() -> BlackoutConfig {
        BlackoutConfig {
            news_enabled: false,
            ..BlackoutConfig::default()
        }
    }

    #[test]
    fn sweep_produces_one_result_per_valid_combination() {
        let ranges = vec![
            ParameterRange {
                indicator_name: "fast_ema".to_string(),
                param_name: "period".to_string(),
                values: vec![5.0, 10.0],
                is_range: true,
                default: 20.0,
            },
            ParameterRange {
                indicator_name: "slow_ema".to_string(),
                param_name: "period".to_string(),
                values: vec![50.0],
                is_range: false,
                default: 50.0,
            },
        ];
        let result = run_sweep(
            &ranges,
            &StrategyConfig::default(),
            &dataset(),
            &no_news_blackout(),
            DirectionMode::Both,
            "sharpe_ratio",
            false,
            None,
            None,
        );
        assert_eq!(result.total_combinations, 2);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.failed_count, 0);
    }

    #[test]
    fn invalid_ema_ordering_is_skipped_before_scoring() {
        let ranges = vec![
            ParameterRange {
                indicator_name: "fast_ema".to_string(),
                param_name: "period".to_string(),
                values: vec![60.0],
                is_range: false,
                default: 20.0,
            },
            ParameterRange {
                indicator_name: "slow_ema".to_string(),
                param_name: "period".to_string(),
                values: vec![50.0],
                is_range: false,
                default: 50.0,
            },
        ];
        let result = run_sweep(
            &ranges,
            &StrategyConfig::default(),
            &dataset(),
            &no_news_blackout(),
            DirectionMode::Both,
            "sharpe_ratio",
            false,
            None,
            None,
        );
        assert_eq!(result.total_combinations, 1);
        assert_eq!(result.results.len(), 0);
    }

    #[test]
    fn parallel_and_sequential_modes_agree_on_combination_count() {
        let ranges = vec![ParameterRange {
            indicator_name: "rsi".to_string(),
            param_name: "length".to_string(),
            values: vec![10.0, 14.0, 20.0],
            is_range: true,
            default: 14.0,
        }];
        let parallel = run_sweep(
            &ranges,
            &StrategyConfig::default(),
            &dataset(),
            &no_news_blackout(),
            DirectionMode::Both,
            "sharpe_ratio",
            true,
            Some(2),
            None,
        );
        let sequential = run_sweep(
            &ranges,
            &StrategyConfig::default(),
            &dataset(),
            &no_news_blackout(),
            DirectionMode::Both,
            "sharpe_ratio",
            false,
            None,
            None,
        );
        assert_eq!(parallel.results.len(), sequential.results.len());
    }

    #[test]
    fn cancelling_before_the_sweep_starts_fails_every_combination() {
        let ranges = vec![ParameterRange {
            indicator_name: "rsi".to_string(),
            param_name: "length".to_string(),
            values: vec![10.0, 14.0, 20.0],
            is_range: true,
            default: 14.0,
        }];
        let cancel = AtomicBool::new(true);
        let result = run_sweep(
            &ranges,
            &StrategyConfig::default(),
            &dataset(),
            &no_news_blackout(),
            DirectionMode::Both,
            "sharpe_ratio",
            false,
            None,
            Some(&cancel),
        );
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.successful_count, 0);
        assert_eq!(result.failed_count, 3);
    }
}
