//! Parameters hash: order-independent SHA-256 over a sorted `key=value` string.
//!
//! Grounded on `original_source/src/strategy/id_factory.py::compute_parameters_hash`.

use std::collections::BTreeMap;

use crate::domain::ids::ParamsHash;

/// `BTreeMap` already yields keys in lexicographic order, so the `sorted(...)`
/// step in the Python original is structural here rather than an explicit
/// sort call. Values are pre-formatted strings using their natural repr
/// (caller's responsibility — e.g. `format!("{v}")` for a float, not a
/// locale-aware formatter).
pub fn compute_parameters_hash(parameters: &BTreeMap<String, String>) -> ParamsHash {
    let joined = parameters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("|");
    ParamsHash::from_bytes(joined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn hash_is_order_independent_over_insertion() {
        let a = params(&[("ema.period", "20"), ("rsi.period", "14")]);
        let b = params(&[("rsi.period", "14"), ("ema.period", "20")]);
        assert_eq!(
            compute_parameters_hash(&a).as_hex(),
            compute_parameters_hash(&b).as_hex()
        );
    }

    #[test]
    fn hash_changes_with_value() {
        let a = params(&[("ema.period", "20")]);
        let b = params(&[("ema.period", "21")]);
        assert_ne!(
            compute_parameters_hash(&a).as_hex(),
            compute_parameters_hash(&b).as_hex()
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let a = params(&[("atr.period", "14"), ("target_r_mult", "2")]);
        assert_eq!(
            compute_parameters_hash(&a).as_hex(),
            compute_parameters_hash(&a).as_hex()
        );
    }

    #[test]
    fn empty_parameters_hash_to_a_fixed_value() {
        let empty: BTreeMap<String, String> = BTreeMap::new();
        let h = compute_parameters_hash(&empty);
        assert_eq!(h.as_hex().len(), 64);
    }
}
