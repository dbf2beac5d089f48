//! Strategy configuration (§6, §10.3): the recognized option bag the config
//! collaborator hands the core. Loading/parsing a config file is out of
//! scope (§1 Non-goals); this type only carries the already-resolved
//! values and validates the cross-field invariants from §7 at construction.
//!
//! Grounded on the teacher's `fingerprint.rs` `ComponentConfig`/`StrategyConfig`
//! pattern: a flat serde struct with per-field `#[serde(default = ...)]`.

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

fn default_ema_fast() -> u32 {
    20
}
fn default_ema_slow() -> u32 {
    50
}
fn default_rsi_length() -> u32 {
    14
}
fn default_atr_length() -> u32 {
    14
}
fn default_rsi_oversold() -> f64 {
    30.0
}
fn default_rsi_overbought() -> f64 {
    70.0
}
fn default_stoch_rsi_low() -> f64 {
    0.2
}
fn default_stoch_rsi_high() -> f64 {
    0.8
}
fn default_pullback_max_age() -> u32 {
    20
}
fn default_trend_cross_count_threshold() -> u32 {
    3
}
fn default_atr_stop_mult() -> f64 {
    2.0
}
fn default_target_r_mult() -> f64 {
    2.0
}
fn default_cooldown_candles() -> u32 {
    5
}
fn default_risk_per_trade_pct() -> f64 {
    0.25
}
fn default_account_balance() -> f64 {
    2500.0
}
fn default_max_position_size() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_ema_fast")]
    pub ema_fast: u32,
    #[serde(default = "default_ema_slow")]
    pub ema_slow: u32,
    #[serde(default = "default_rsi_length")]
    pub rsi_length: u32,
    #[serde(default = "default_atr_length")]
    pub atr_length: u32,
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    #[serde(default = "default_stoch_rsi_low")]
    pub stoch_rsi_low: f64,
    #[serde(default = "default_stoch_rsi_high")]
    pub stoch_rsi_high: f64,
    #[serde(default = "default_pullback_max_age")]
    pub pullback_max_age: u32,
    #[serde(default = "default_trend_cross_count_threshold")]
    pub trend_cross_count_threshold: u32,
    #[serde(default = "default_atr_stop_mult")]
    pub atr_stop_mult: f64,
    #[serde(default = "default_target_r_mult")]
    pub target_r_mult: f64,
    #[serde(default = "default_cooldown_candles")]
    pub cooldown_candles: u32,
    #[serde(default = "default_risk_per_trade_pct")]
    pub risk_per_trade_pct: f64,
    #[serde(default = "default_account_balance")]
    pub account_balance: f64,
    #[serde(default = "default_max_position_size")]
    pub max_position_size: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            rsi_length: default_rsi_length(),
            atr_length: default_atr_length(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            stoch_rsi_low: default_stoch_rsi_low(),
            stoch_rsi_high: default_stoch_rsi_high(),
            pullback_max_age: default_pullback_max_age(),
            trend_cross_count_threshold: default_trend_cross_count_threshold(),
            atr_stop_mult: default_atr_stop_mult(),
            target_r_mult: default_target_r_mult(),
            cooldown_candles: default_cooldown_candles(),
            risk_per_trade_pct: default_risk_per_trade_pct(),
            account_balance: default_account_balance(),
            max_position_size: default_max_position_size(),
        }
    }
}

impl StrategyConfig {
    /// Validates the cross-field invariants from §7: fatal at config parse
    /// time, never reached by the rest of the core.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.ema_slow <= self.ema_fast {
            return Err(ParameterError::EmaOrdering {
                fast: self.ema_fast,
                slow: self.ema_slow,
            });
        }
        if !(0.0..self.rsi_overbought).contains(&self.rsi_oversold) || self.rsi_overbought > 100.0
        {
            return Err(ParameterError::RsiThresholdOrdering {
                oversold: self.rsi_oversold,
                overbought: self.rsi_overbought,
            });
        }
        for (field, value) in [
            ("atr_stop_mult", self.atr_stop_mult),
            ("target_r_mult", self.target_r_mult),
            ("risk_per_trade_pct", self.risk_per_trade_pct),
            ("account_balance", self.account_balance),
        ] {
            if value <= 0.0 {
                return Err(ParameterError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
