//! Error kinds, one per-subsystem enum per spec.md §7, aggregated by
//! `EngineError` for the fatal cases. Non-fatal conditions (unknown
//! indicator spec, invalid single entry, a sweep worker failing) are not
//! represented as propagated errors at all — they are logged/captured and
//! the caller continues, per the recovery policy in §7.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestionError {
    #[error("candle table missing required column '{0}'")]
    MissingColumn(String),
    #[error("non-monotonic timestamp at index {index}")]
    NonMonotonicTimestamp { index: usize },
    #[error("candle table is empty")]
    Empty,
    #[error("invalid OHLC ordering at index {index}")]
    InvalidOhlc { index: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("ema_slow ({slow}) must exceed ema_fast ({fast})")]
    EmaOrdering { fast: u32, slow: u32 },
    #[error("rsi_oversold ({oversold}) must be less than rsi_overbought ({overbought})")]
    RsiThresholdOrdering { oversold: f64, overbought: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlackoutConfigError {
    #[error("malformed time string '{0}', expected HH:MM")]
    MalformedTime(String),
    #[error("blackout window end ({end}) is not after start ({start})")]
    InvertedWindow { start: String, end: String },
    #[error("pre_close_minutes must be <= 60, got {0}")]
    PreCloseTooLarge(u32),
    #[error("post_pause_minutes must be <= 120, got {0}")]
    PostPauseTooLarge(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("invalid entry: entry_price equals initial_stop_price for signal {signal_id}")]
    InvalidEntry { signal_id: String },
}

/// Aggregates the error kinds that are fatal to a run (§7: ingestion and
/// configuration violations). Mirrors the teacher's `RunError` `#[from]`
/// aggregation pattern.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ingestion error: {0}")]
    Ingestion(#[from] IngestionError),
    #[error("parameter error: {0}")]
    Parameter(#[from] ParameterError),
    #[error("blackout configuration error: {0}")]
    BlackoutConfig(#[from] BlackoutConfigError),
}
