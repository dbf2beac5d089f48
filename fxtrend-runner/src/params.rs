//! Maps a `ParameterSet` onto a concrete `StrategyConfig` (§4.9 step 3).
//!
//! `ParameterSet` carries raw `f64` values keyed by indicator/param name,
//! mirroring the user-facing sweep vocabulary
//! (`original_source/src/cli/prompts/range_input.py`'s `fast_ema`/`slow_ema`
//! naming); this module is the one place that knows how those names map
//! onto `fxtrend_core::config::StrategyConfig`'s typed fields.

use fxtrend_core::config::StrategyConfig;

use crate::sweep::ParameterSet;

/// Applies every `(indicator_name, param_name)` entry in `params` that this
/// sweep recognizes onto a clone of `base`. Unrecognized entries are
/// ignored — a sweep over an indicator this crate doesn't wire up yet
/// should not be a hard error, just a no-op on that axis.
pub fn apply_parameter_set(base: &StrategyConfig, params: &ParameterSet) -> StrategyConfig {
    let mut config = base.clone();

    if let Some(v) = params.get("fast_ema", "period") {
        config.ema_fast = v as u32;
    }
    if let Some(v) = params.get("slow_ema", "period") {
        config.ema_slow = v as u32;
    }
    if let Some(v) = params.get("rsi", "length") {
        config.rsi_length = v as u32;
    }
    if let Some(v) = params.get("rsi", "oversold") {
        config.rsi_oversold = v;
    }
    if let Some(v) = params.get("rsi", "overbought") {
        config.rsi_overbought = v;
    }
    if let Some(v) = params.get("stoch_rsi", "low") {
        config.stoch_rsi_low = v;
    }
    if let Some(v) = params.get("stoch_rsi", "high") {
        config.stoch_rsi_high = v;
    }
    if let Some(v) = params.get("atr", "length") {
        config.atr_length = v as u32;
    }
    if let Some(v) = params.get("atr", "stop_mult") {
        config.atr_stop_mult = v;
    }
    if let Some(v) = params.get("target", "r_mult") {
        config.target_r_mult = v;
    }
    if let Some(v) = params.get("pullback", "max_age") {
        config.pullback_max_age = v as u32;
    }
    if let Some(v) = params.get("trend", "cross_count_threshold") {
        config.trend_cross_count_threshold = v as u32;
    }
    if let Some(v) = params.get("cooldown", "candles") {
        config.cooldown_candles = v as u32;
    }
    if let Some(v) = params.get("risk", "per_trade_pct") {
        config.risk_per_trade_pct = v;
    }
    if let Some(v) = params.get("account", "balance") {
        config.account_balance = v;
    }
    if let Some(v) = params.get("position", "max_size") {
        config.max_position_size = v;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn param_set(entries: &[(&str, &str, f64)]) -> ParameterSet {
        let mut params: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for &(ind, p, v) in entries {
            params.entry(ind.to_string()).or_default().insert(p.to_string(), v);
        }
        ParameterSet { params, label: String::new() }
    }

    #[test]
    fn recognized_fields_override_base_config() {
        let base = StrategyConfig::default();
        let overrides = param_set(&[("fast_ema", "period", 10.0), ("slow_ema", "period", 80.0)]);
        let config = apply_parameter_set(&base, &overrides);
        assert_eq!(config.ema_fast, 10);
        assert_eq!(config.ema_slow, 80);
        assert_eq!(config.rsi_length, base.rsi_length);
    }

    #[test]
    fn unrecognized_entries_are_ignored() {
        let base = StrategyConfig::default();
        let overrides = param_set(&[("unknown_indicator", "period", 99.0)]);
        let config = apply_parameter_set(&base, &overrides);
        assert_eq!(config.ema_fast, base.ema_fast);
    }
}
