//! fxtrend-core — the FX trend-pullback-continuation backtesting engine.
//!
//! This crate contains the deterministic core described by components
//! A-H: identity & reproducibility, the indicator engine, the blackout
//! engine, the signal scanner, the concurrency filter, the trade
//! simulator, the portfolio scheduler, and metrics & drawdown. Component I
//! (the parameter sweep executor) lives in the sibling `fxtrend-runner`
//! crate, built on top of this one.

pub mod backtest;
pub mod blackout;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod indicators;
pub mod metrics;
pub mod portfolio;
pub mod signals;
pub mod simulate;
