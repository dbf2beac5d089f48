//! Domain types for the trend-pullback-continuation backtesting engine.

pub mod candle;
pub mod ids;
pub mod run;
pub mod signal;
pub mod trade;

pub use candle::{Candle, CandleTable, CandleTableError};
pub use ids::{ParamsHash, RunId};
pub use run::{BacktestRun, BlackoutWindow, DataManifest, MetricsSummary, WindowSource};
pub use signal::{Direction, PullbackState, TradeSignal, TrendClass, TrendState};
pub use trade::{ClosedTrade, ExitReason, TradeExecution};

/// Symbol type alias
pub type Symbol = String;
