//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// OHLCV candle for a single symbol at a single intraday timestamp.
///
/// `indicators` is an open bag keyed by indicator spec string (e.g. `"ema20"`,
/// `"rsi14"`) so the indicator engine can append arbitrary columns without a
/// struct-field explosion. `indicator()` gives single-row access by name;
/// bulk computation happens column-wise over a `CandleTable`, not per-candle.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp_utc: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
    pub indicators: BTreeMap<String, f64>,
}

impl Candle {
    pub fn new(timestamp_utc: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp_utc,
            open,
            high,
            low,
            close,
            volume: None,
            indicators: BTreeMap::new(),
        }
    }

    /// Returns true if any OHLC field is NaN (void candle).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// `low ≤ min(open, close) ≤ max(open, close) ≤ high`, per the candle table invariant.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let lo = self.open.min(self.close);
        let hi = self.open.max(self.close);
        self.low <= lo && lo <= hi && hi <= self.high
    }

    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Error raised while validating or constructing a [`CandleTable`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CandleTableError {
    #[error("candle table is empty")]
    Empty,
    #[error("non-monotonic timestamp at index {index}: {prev} is not before {next}")]
    NonMonotonicTimestamp {
        index: usize,
        prev: String,
        next: String,
    },
    #[error("invalid OHLC ordering at index {index}")]
    InvalidOhlc { index: usize },
}

/// Columnar candle table: immutable once ingested, indicator columns appended once.
///
/// Stored as parallel `Vec<f64>` columns (open/high/low/close/volume) plus a
/// `Vec<DateTime<Utc>>` timestamp column, matching the "columnar engine or
/// hand-rolled vectorized code" latitude in spec.md §9. Indicator columns are
/// appended by name into `columns` so downstream scanner code addresses them
/// symbolically rather than through fixed struct fields.
#[derive(Debug, Clone, Default)]
pub struct CandleTable {
    pub timestamp_utc: Vec<DateTime<Utc>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Option<Vec<f64>>,
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl CandleTable {
    pub fn len(&self) -> usize {
        self.timestamp_utc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp_utc.is_empty()
    }

    /// Validates the required-column invariants from spec.md §3.
    pub fn validate(&self) -> Result<(), CandleTableError> {
        if self.is_empty() {
            return Err(CandleTableError::Empty);
        }
        for i in 1..self.timestamp_utc.len() {
            if self.timestamp_utc[i] < self.timestamp_utc[i - 1] {
                return Err(CandleTableError::NonMonotonicTimestamp {
                    index: i,
                    prev: self.timestamp_utc[i - 1].to_rfc3339(),
                    next: self.timestamp_utc[i].to_rfc3339(),
                });
            }
        }
        for i in 0..self.len() {
            let lo = self.open[i].min(self.close[i]);
            let hi = self.open[i].max(self.close[i]);
            if !(self.low[i] <= lo && lo <= hi && hi <= self.high[i]) {
                return Err(CandleTableError::InvalidOhlc { index: i });
            }
        }
        Ok(())
    }

    /// Appends or overwrites a named indicator column. Does not resize the table;
    /// callers are expected to produce one value per row (NaN for warm-up rows).
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut table = CandleTable {
            timestamp_utc: Vec::with_capacity(candles.len()),
            open: Vec::with_capacity(candles.len()),
            high: Vec::with_capacity(candles.len()),
            low: Vec::with_capacity(candles.len()),
            close: Vec::with_capacity(candles.len()),
            volume: None,
            columns: BTreeMap::new(),
        };
        let mut volumes = Vec::with_capacity(candles.len());
        let mut any_volume = false;
        for c in candles {
            table.timestamp_utc.push(c.timestamp_utc);
            table.open.push(c.open);
            table.high.push(c.high);
            table.low.push(c.low);
            table.close.push(c.close);
            if let Some(v) = c.volume {
                any_volume = true;
                volumes.push(v);
            } else {
                volumes.push(f64::NAN);
            }
            for (k, v) in &c.indicators {
                table.columns.entry(k.clone()).or_default().push(*v);
            }
        }
        if any_volume {
            table.volume = Some(volumes);
        }
        table
    }
}
