//! Per-combination and aggregate sweep results (§4.9 steps 3-4).
//!
//! Grounded on `original_source/src/backtest/sweep.py`'s `SingleResult`,
//! `SweepResult`, and `rank_results`.

use crate::sweep::ParameterSet;

/// Outcome of running one parameter combination's backtest. A failed
/// combination still produces a `SingleResult` — the worker never
/// propagates the failure outward (§4.9 Failure semantics).
#[derive(Debug, Clone)]
pub struct SingleResult {
    pub params: ParameterSet,
    pub sharpe_ratio: f64,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub trade_count: u64,
    pub max_drawdown: f64,
    pub error: Option<String>,
}

impl SingleResult {
    pub fn failed(params: ParameterSet, error: impl Into<String>) -> Self {
        Self {
            params,
            sharpe_ratio: 0.0,
            total_pnl: 0.0,
            win_rate: 0.0,
            trade_count: 0,
            max_drawdown: 0.0,
            error: Some(error.into()),
        }
    }

    fn metric(&self, metric: &str) -> f64 {
        match metric {
            "total_pnl" => self.total_pnl,
            "win_rate" => self.win_rate,
            "trade_count" => self.trade_count as f64,
            "max_drawdown" => self.max_drawdown,
            _ => self.sharpe_ratio,
        }
    }
}

/// The full sweep's aggregate result (§4.9 step 4).
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub results: Vec<SingleResult>,
    pub best_params: Option<ParameterSet>,
    pub ranking_metric: String,
    pub execution_time_seconds: f64,
    pub total_combinations: usize,
    pub successful_count: usize,
    pub failed_count: usize,
}

/// Ranks results descending by `metric`, dropping failures, matching
/// `rank_results`' `reverse=not ascending` default.
pub fn rank_results(results: &[SingleResult], metric: &str) -> Vec<&SingleResult> {
    let mut successful: Vec<&SingleResult> = results.iter().filter(|r| r.error.is_none()).collect();
    successful.sort_by(|a, b| {
        b.metric(metric)
            .partial_cmp(&a.metric(metric))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    successful
}
