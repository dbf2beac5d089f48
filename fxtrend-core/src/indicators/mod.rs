//! Indicator Engine (§4.2): parses indicator spec strings, dispatches to a
//! closed registry of implementations, and appends the resulting columns to
//! a [`crate::domain::CandleTable`].
//!
//! Computation itself is purely functional over plain `&[f64]` slices —
//! every indicator module here (`ema`, `sma`, `atr`, `rsi`, `stoch_rsi`,
//! `stats`) is free of any table/dispatch concern, kept precisely the way
//! the teacher's original per-indicator modules were structured, just
//! rebased off plain slices instead of `Bar`/`Indicator` machinery.

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod stoch_rsi;

pub use atr::{atr, true_range};
pub use ema::ema_of_series;
pub use rsi::rsi;
pub use sma::sma;
pub use stats::{std, zscore};
pub use stoch_rsi::stoch_rsi;

use std::collections::BTreeMap;

use crate::domain::CandleTable;

/// Parsed `(name, parameters)` pair for one indicator spec string, per
/// §4.2's two accepted syntaxes. `period` is the only positional parameter
/// any registry entry currently reads; `overrides` holds named `k=v` pairs
/// from the functional syntax, or an explicit `output_col` override.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub name: String,
    pub period: Option<usize>,
    pub overrides: BTreeMap<String, String>,
}

impl IndicatorSpec {
    /// `output_col` override, if the spec carried one, else `None` — the
    /// caller falls back to the registry's default column-naming rule.
    pub fn output_col_override(&self) -> Option<&str> {
        self.overrides.get("output_col").map(String::as_str)
    }
}

/// Parses one spec string. Two syntaxes (§4.2):
/// - legacy shorthand `name<digits>` → `name, {period: digits}` (e.g. `ema20`);
/// - functional `name(arg, k=v, ...)` → first positional int is `period`,
///   remaining `k=v` pairs become overrides.
///
/// Returns `None` if the string matches neither shape; the caller treats
/// that as an unknown spec (logged and skipped, not fatal).
pub fn parse_spec(spec: &str) -> Option<IndicatorSpec> {
    let spec = spec.trim();
    if spec.is_empty() {
        return None;
    }
    if let Some(open_paren) = spec.find('(') {
        if !spec.ends_with(')') {
            return None;
        }
        let name = spec[..open_paren].trim().to_string();
        if name.is_empty() {
            return None;
        }
        let inner = &spec[open_paren + 1..spec.len() - 1];
        let mut period = None;
        let mut overrides = BTreeMap::new();
        for part in inner.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((k, v)) = part.split_once('=') {
                overrides.insert(k.trim().to_string(), v.trim().to_string());
            } else if period.is_none() {
                period = part.parse::<usize>().ok();
            }
        }
        return Some(IndicatorSpec {
            name,
            period,
            overrides,
        });
    }

    let digits_start = spec.find(|c: char| c.is_ascii_digit());
    match digits_start {
        Some(idx) if idx > 0 => {
            let (name, digits) = spec.split_at(idx);
            if digits.chars().all(|c| c.is_ascii_digit()) {
                Some(IndicatorSpec {
                    name: name.to_string(),
                    period: digits.parse::<usize>().ok(),
                    overrides: BTreeMap::new(),
                })
            } else {
                None
            }
        }
        _ => Some(IndicatorSpec {
            name: spec.to_string(),
            period: None,
            overrides: BTreeMap::new(),
        }),
    }
}

/// Default output column name for a registry entry given its resolved
/// period, following §4.2's table (`stoch_rsi`'s column is the bare name,
/// every other indicator's is `<name><period>`).
fn default_output_col(name: &str, period: Option<usize>) -> String {
    match name {
        "stoch_rsi" => "stoch_rsi".to_string(),
        "sma" | "mean" => match period {
            Some(p) => format!("sma{p}"),
            None => "sma".to_string(),
        },
        _ => match period {
            Some(p) => format!("{name}{p}"),
            None => name.to_string(),
        },
    }
}

/// Computes and appends every requested indicator spec to `table`. Unknown
/// specs (unparseable strings, or names absent from the closed registry)
/// are logged via `tracing::warn` and skipped — the dispatcher is not
/// fatal on a bad spec (§4.2).
pub fn apply_specs(table: &mut CandleTable, specs: &[String]) {
    for raw in specs {
        let Some(parsed) = parse_spec(raw) else {
            tracing::warn!(spec = %raw, "unparseable indicator spec, skipping");
            continue;
        };
        apply_one(table, &parsed, raw);
    }
}

fn apply_one(table: &mut CandleTable, parsed: &IndicatorSpec, raw: &str) {
    let period = parsed.period.unwrap_or(14);
    let output_col = parsed
        .output_col_override()
        .map(str::to_string)
        .unwrap_or_else(|| default_output_col(&parsed.name, parsed.period));

    let values: Vec<f64> = match parsed.name.as_str() {
        "ema" | "fast_ema" | "slow_ema" => ema_of_series(&table.close, period),
        "sma" | "mean" => sma(&table.close, period),
        "atr" => atr(&table.high, &table.low, &table.close, period),
        "rsi" => rsi(&table.close, period),
        "stoch_rsi" => {
            let base_rsi = match table.column("rsi") {
                Some(existing) => existing.to_vec(),
                None => {
                    let computed = rsi(&table.close, period);
                    table.set_column("rsi".to_string(), computed.clone());
                    computed
                }
            };
            stoch_rsi(&base_rsi, period)
        }
        "std" => std(&table.close, period),
        "zscore" => zscore(&table.close, period),
        unknown => {
            tracing::warn!(name = %unknown, spec = %raw, "unknown indicator spec, skipping");
            return;
        }
    };
    table.set_column(output_col, values);
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_shorthand() {
        let spec = parse_spec("ema20").unwrap();
        assert_eq!(spec.name, "ema");
        assert_eq!(spec.period, Some(20));
    }

    #[test]
    fn parses_functional_syntax_with_overrides() {
        let spec = parse_spec("ema(20, output_col=fast_ema)").unwrap();
        assert_eq!(spec.name, "ema");
        assert_eq!(spec.period, Some(20));
        assert_eq!(spec.output_col_override(), Some("fast_ema"));
    }

    #[test]
    fn parses_bare_name_with_no_period() {
        let spec = parse_spec("stoch_rsi").unwrap();
        assert_eq!(spec.name, "stoch_rsi");
        assert_eq!(spec.period, None);
    }

    #[test]
    fn rejects_malformed_functional_syntax() {
        assert!(parse_spec("ema(20").is_none());
    }

    #[test]
    fn default_output_col_matches_spec_table() {
        assert_eq!(default_output_col("ema", Some(20)), "ema20");
        assert_eq!(default_output_col("atr", Some(14)), "atr14");
        assert_eq!(default_output_col("stoch_rsi", Some(14)), "stoch_rsi");
    }

    fn candles_for(close: &[f64]) -> CandleTable {
        use crate::domain::Candle;
        use chrono::{TimeZone, Utc};
        let candles: Vec<Candle> = close
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                timestamp_utc: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: None,
                indicators: BTreeMap::new(),
            })
            .collect();
        CandleTable::from_candles(&candles)
    }

    #[test]
    fn apply_specs_skips_unknown_and_keeps_known() {
        let mut table = candles_for(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        apply_specs(
            &mut table,
            &["ema3".to_string(), "not_a_real_indicator".to_string()],
        );
        assert!(table.column("ema3").is_some());
        assert!(table.column("not_a_real_indicator").is_none());
    }

    #[test]
    fn stoch_rsi_without_rsi_column_computes_rsi_first() {
        let mut table = candles_for(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        apply_specs(&mut table, &["stoch_rsi(4)".to_string()]);
        assert!(table.column("rsi").is_some());
        assert!(table.column("stoch_rsi").is_some());
    }
}
