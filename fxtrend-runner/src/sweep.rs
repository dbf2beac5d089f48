//! Parameter range collection and Cartesian expansion (§4.9 steps 1-2).
//!
//! Grounded on `original_source/src/backtest/sweep.py`'s `ParameterRange`,
//! `parse_range_input`, `generate_combinations`, and
//! `filter_invalid_combinations` — re-expressed with `f64` values and a
//! `BTreeMap` instead of a Python `dict` so iteration order is part of the
//! type rather than an incidental property of insertion order.

use std::collections::BTreeMap;

use thiserror::Error;

/// User input for a single indicator parameter: either one value or a
/// stepped range, always expanded to the concrete list to test.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    pub indicator_name: String,
    pub param_name: String,
    pub values: Vec<f64>,
    pub is_range: bool,
    pub default: f64,
}

/// One concrete combination of all swept parameters: `{indicator_name:
/// {param_name: value}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub params: BTreeMap<String, BTreeMap<String, f64>>,
    pub label: String,
}

impl ParameterSet {
    fn new(params: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        let label = params
            .iter()
            .flat_map(|(ind, ps)| ps.iter().map(move |(p, v)| format!("{ind}.{p}={v}")))
            .collect::<Vec<_>>()
            .join(", ");
        Self { params, label }
    }

    pub fn get(&self, indicator_name: &str, param_name: &str) -> Option<f64> {
        self.params.get(indicator_name)?.get(param_name).copied()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RangeParseError {
    #[error("step must be positive")]
    NonPositiveStep,
    #[error("range start must be <= end")]
    StartAfterEnd,
    #[error("invalid input format: '{0}'; use a single value or 'start-end step N'")]
    InvalidFormat(String),
}

/// Parses `""` (default), `"15"` (single value), or `"10-30 step 5"` (range)
/// into the expanded value list, matching `parse_range_input`'s three
/// branches and its inclusive-upper-bound epsilon.
pub fn parse_range_input(input: &str, default: f64) -> Result<(Vec<f64>, bool), RangeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok((vec![default], false));
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        return Ok((vec![value], false));
    }

    let Some((bounds, step_str)) = trimmed.split_once("step") else {
        return Err(RangeParseError::InvalidFormat(trimmed.to_string()));
    };
    let Some((start_str, end_str)) = bounds.trim().split_once('-') else {
        return Err(RangeParseError::InvalidFormat(trimmed.to_string()));
    };
    let parse = |s: &str| -> Result<f64, RangeParseError> {
        s.trim()
            .parse::<f64>()
            .map_err(|_| RangeParseError::InvalidFormat(trimmed.to_string()))
    };
    let start = parse(start_str)?;
    let end = parse(end_str)?;
    let step = parse(step_str)?;

    if step <= 0.0 {
        return Err(RangeParseError::NonPositiveStep);
    }
    if start > end {
        return Err(RangeParseError::StartAfterEnd);
    }

    let mut values = Vec::new();
    let mut current = start;
    while current <= end + step / 100.0 {
        values.push(current);
        current += step;
    }
    Ok((values, true))
}

/// Cartesian product of all ranges, grouped by indicator name and sorted so
/// expansion order (and therefore `ParameterSet::label`) is deterministic.
pub fn generate_combinations(ranges: &[ParameterRange]) -> Vec<ParameterSet> {
    if ranges.is_empty() {
        return Vec::new();
    }

    let mut keys: Vec<(&str, &str)> = Vec::with_capacity(ranges.len());
    let mut value_lists: Vec<&[f64]> = Vec::with_capacity(ranges.len());
    let mut by_indicator: BTreeMap<&str, Vec<&ParameterRange>> = BTreeMap::new();
    for r in ranges {
        by_indicator.entry(&r.indicator_name).or_default().push(r);
    }
    for (_, group) in by_indicator {
        for r in group {
            keys.push((&r.indicator_name, &r.param_name));
            value_lists.push(&r.values);
        }
    }

    let mut combos: Vec<BTreeMap<String, BTreeMap<String, f64>>> = vec![BTreeMap::new()];
    for (idx, values) in value_lists.iter().enumerate() {
        let (indicator_name, param_name) = keys[idx];
        let mut next = Vec::with_capacity(combos.len() * values.len());
        for combo in &combos {
            for &value in *values {
                let mut extended = combo.clone();
                extended
                    .entry(indicator_name.to_string())
                    .or_default()
                    .insert(param_name.to_string(), value);
                next.push(extended);
            }
        }
        combos = next;
    }

    combos.into_iter().map(ParameterSet::new).collect()
}

/// A combination-validity predicate; returns `true` when the combination
/// may proceed to simulation.
pub type Constraint = Box<dyn Fn(&ParameterSet) -> bool + Send + Sync>;

/// The sweep's one built-in constraint: a fast EMA must stay faster than the
/// slow EMA it is paired against. Combinations lacking either leg pass
/// (there is nothing to constrain).
pub fn fast_slow_ema_constraint(ps: &ParameterSet) -> bool {
    match (ps.get("fast_ema", "period"), ps.get("slow_ema", "period")) {
        (Some(fast), Some(slow)) => fast < slow,
        _ => true,
    }
}

/// Filters combinations against `constraints`, returning `(valid, skipped_count)`.
/// Defaults to `[fast_slow_ema_constraint]` when `constraints` is empty.
pub fn filter_invalid_combinations(
    combinations: Vec<ParameterSet>,
    constraints: &[Constraint],
) -> (Vec<ParameterSet>, usize) {
    let default_constraints: Vec<Constraint> = vec![Box::new(fast_slow_ema_constraint)];
    let constraints = if constraints.is_empty() {
        &default_constraints
    } else {
        constraints
    };

    let mut valid = Vec::new();
    let mut skipped = 0usize;
    for combo in combinations {
        if constraints.iter().all(|c| c(&combo)) {
            valid.push(combo);
        } else {
            skipped += 1;
        }
    }
    (valid, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(indicator: &str, param: &str, values: Vec<f64>) -> ParameterRange {
        ParameterRange {
            indicator_name: indicator.to_string(),
            param_name: param.to_string(),
            is_range: values.len() > 1,
            default: values[0],
            values,
        }
    }

    #[test]
    fn empty_input_uses_default() {
        assert_eq!(parse_range_input("", 20.0), Ok((vec![20.0], false)));
    }

    #[test]
    fn single_value_is_not_a_range() {
        assert_eq!(parse_range_input("15", 20.0), Ok((vec![15.0], false)));
    }

    #[test]
    fn stepped_range_expands_inclusively() {
        let (values, is_range) = parse_range_input("10-30 step 5", 20.0).unwrap();
        assert_eq!(values, vec![10.0, 15.0, 20.0, 25.0, 30.0]);
        assert!(is_range);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(
            parse_range_input("10-30 step 0", 20.0),
            Err(RangeParseError::NonPositiveStep)
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert_eq!(
            parse_range_input("30-10 step 5", 20.0),
            Err(RangeParseError::StartAfterEnd)
        );
    }

    #[test]
    fn cartesian_product_covers_every_pairing() {
        let ranges = vec![
            range("fast_ema", "period", vec![5.0, 10.0]),
            range("slow_ema", "period", vec![50.0]),
        ];
        let combos = generate_combinations(&ranges);
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].get("fast_ema", "period"), Some(5.0));
        assert_eq!(combos[1].get("fast_ema", "period"), Some(10.0));
        assert_eq!(combos[0].get("slow_ema", "period"), Some(50.0));
    }

    #[test]
    fn default_constraint_filters_fast_not_less_than_slow() {
        let ranges = vec![
            range("fast_ema", "period", vec![5.0, 10.0]),
            range("slow_ema", "period", vec![5.0]),
        ];
        let combos = generate_combinations(&ranges);
        let (valid, skipped) = filter_invalid_combinations(combos, &[]);
        assert_eq!(valid.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(valid[0].get("fast_ema", "period"), Some(5.0));
    }

    #[test]
    fn combination_without_ema_legs_always_passes() {
        let ranges = vec![range("rsi", "length", vec![10.0, 14.0])];
        let combos = generate_combinations(&ranges);
        let (valid, skipped) = filter_invalid_combinations(combos, &[]);
        assert_eq!(valid.len(), 2);
        assert_eq!(skipped, 0);
    }
}
