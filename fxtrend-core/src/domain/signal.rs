//! TradeSignal and the row-snapshot state types the scanner can materialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction. `Display` lowercases to match the `"long"`/`"short"` tag
/// vocabulary used in `TradeSignal::tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_tag(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// A validated trade signal ready for execution, frozen once produced.
///
/// `id` is the SHA-256 signal ID from [`crate::identity::signal_id`].
/// Invariant: for `Long`, `initial_stop_price < entry_price < target_price`;
/// for `Short`, reversed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub id: String,
    pub pair: String,
    pub direction: Direction,
    pub timestamp_utc: DateTime<Utc>,
    pub entry_price: f64,
    pub initial_stop_price: f64,
    pub target_price: f64,
    pub risk_per_trade_pct: f64,
    pub calc_position_size: f64,
    pub tags: Vec<String>,
    pub version: String,
}

impl TradeSignal {
    /// Checks the entry/stop/target ordering invariant from spec.md §3.
    pub fn is_valid_ordering(&self) -> bool {
        match self.direction {
            Direction::Long => {
                self.initial_stop_price < self.entry_price && self.entry_price < self.target_price
            }
            Direction::Short => {
                self.initial_stop_price > self.entry_price && self.entry_price > self.target_price
            }
        }
    }

    pub fn risk_distance(&self) -> f64 {
        (self.entry_price - self.initial_stop_price).abs()
    }
}

/// Trend classification for a single row, materialized on demand for
/// introspection/tests (§11.3). The vectorized scanner works over the
/// equivalent `i8` column directly; this type is not on the hot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendClass {
    Up,
    Down,
    Range,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendState {
    pub state: TrendClass,
    pub cross_count: u32,
    pub last_change_timestamp: Option<DateTime<Utc>>,
}

/// Pullback activation snapshot for a single row (§11.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullbackState {
    pub active: bool,
    pub direction: Direction,
    pub start_timestamp: DateTime<Utc>,
    pub qualifying_candle_ids: Vec<String>,
    pub oscillator_extreme_flag: bool,
}
