//! TradeExecution / ClosedTrade — completed round-trip trades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::Direction;

/// Why a trade exited. `Display` matches the wire vocabulary used in
/// traceability strings (`event_type|event_data` accumulator entries, error
/// context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Target,
    StopLoss,
    TrailingStop,
    Timeout,
    EndOfData,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExitReason::Target => "TARGET",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TrailingStop => "TRAILING_STOP",
            ExitReason::Timeout => "TIMEOUT",
            ExitReason::EndOfData => "END_OF_DATA",
        };
        f.write_str(s)
    }
}

/// A single symbol's completed round-trip, as produced directly by the
/// trade simulator (§4.6) before portfolio re-pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecution {
    pub signal_id: String,
    pub direction: Direction,
    pub open_timestamp: DateTime<Utc>,
    pub entry_fill_price: f64,
    pub close_timestamp: DateTime<Utc>,
    pub exit_fill_price: f64,
    pub exit_reason: ExitReason,
    pub pnl_r: f64,
    pub slippage_entry_pips: f64,
    pub slippage_exit_pips: f64,
    pub costs_total: f64,
    /// Maximum adverse excursion in R-multiples, supplemented per §11.1.
    pub mae_r: Option<f64>,
    /// Maximum favorable excursion in R-multiples, supplemented per §11.1.
    pub mfe_r: Option<f64>,
}

impl TradeExecution {
    pub fn is_valid_duration(&self) -> bool {
        self.close_timestamp >= self.open_timestamp
    }
}

/// A `TradeExecution` attributed to a symbol, carried through the portfolio
/// scheduler's chronological merge and shared-equity re-pricing (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub symbol: String,
    pub signal_id: String,
    pub direction: Direction,
    pub entry_timestamp: DateTime<Utc>,
    pub exit_timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub pnl_r: f64,
    /// Populated only after portfolio re-pricing (§4.7); `None` beforehand.
    pub risk_amount: Option<f64>,
    pub pnl_dollars: Option<f64>,
    pub mae_r: Option<f64>,
    pub mfe_r: Option<f64>,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl_r > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl_r < 0.0
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.exit_timestamp - self.entry_timestamp).num_seconds()
    }
}
