//! fxtrend-runner — the parameter sweep executor (Component I, §4.9).
//!
//! Given a set of `ParameterRange`s, expands the Cartesian product, drops
//! combinations that violate the default `fast_ema.period < slow_ema.period`
//! constraint, and fans the rest out to a worker pool (or runs them
//! sequentially for debugging) built on `fxtrend-core`'s per-symbol
//! orchestration and portfolio scheduler.

pub mod params;
pub mod result;
pub mod runner;
pub mod sweep;

pub use params::apply_parameter_set;
pub use result::{rank_results, SingleResult, SweepResult};
pub use runner::{run_sweep, Dataset};
pub use sweep::{
    filter_invalid_combinations, generate_combinations, parse_range_input, ParameterRange,
    ParameterSet, RangeParseError,
};
