//! Run-level records: BacktestRun, DataManifest, MetricsSummary, BlackoutWindow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time interval during which new entries are forbidden.
///
/// Invariant: `end_utc > start_utc`, both tz-aware (enforced by [`BlackoutWindow::new`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowSource {
    News,
    Session,
    SessionOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutWindow {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub source: WindowSource,
}

impl BlackoutWindow {
    pub fn new(
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        source: WindowSource,
    ) -> Result<Self, crate::error::BlackoutConfigError> {
        if end_utc <= start_utc {
            return Err(crate::error::BlackoutConfigError::InvertedWindow {
                start: start_utc.to_rfc3339(),
                end: end_utc.to_rfc3339(),
            });
        }
        Ok(Self {
            start_utc,
            end_utc,
            source,
        })
    }

    /// Closed-interval containment on both ends, per spec.md §4.3.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start_utc <= ts && ts <= self.end_utc
    }
}

/// Metadata and configuration for one backtest execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRun {
    pub run_id: String,
    pub parameters_hash: String,
    pub manifest_ref: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_candles_processed: u64,
    pub reproducibility_hash: String,
}

/// Data provenance record (§11.2). Construction/parsing of the underlying
/// data file is the ingestion collaborator's job; this type only carries the
/// already-known metadata referenced by `BacktestRun.manifest_ref`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataManifest {
    pub pair: String,
    pub timeframe: String,
    pub date_range_start: DateTime<Utc>,
    pub date_range_end: DateTime<Utc>,
    pub source_provider: String,
    pub checksum: String,
    pub preprocessing_notes: String,
    pub total_candles: u64,
    pub file_path: String,
}

/// Aggregated performance metrics for a backtest run (§4.8, plus the latency
/// fields supplemented from `original_source` per §11.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub trade_count: u64,
    pub win_count: u64,
    pub loss_count: u64,
    pub breakeven_count: u64,
    pub win_rate: f64,
    pub avg_win_r: f64,
    pub avg_loss_r: f64,
    pub avg_r: f64,
    pub expectancy: f64,
    pub sharpe_estimate: f64,
    pub sortino_ratio: f64,
    pub profit_factor: f64,
    pub max_drawdown_r: f64,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub avg_trade_duration_seconds: f64,
    pub latency_p95_ms: Option<f64>,
    pub latency_mean_ms: Option<f64>,
}
