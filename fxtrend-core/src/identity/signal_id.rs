//! Signal-ID factory: deterministic SHA-256 over the signal's identifying
//! fields.
//!
//! Grounded on `original_source/src/strategy/id_factory.py::generate_signal_id`.
//! Canonical string: `pair|iso_ts|direction|entry(6dp)|stop(6dp)|size(6dp)|params_hash`.

use chrono::{DateTime, Utc};

use crate::domain::ids::ParamsHash;
use crate::domain::signal::Direction;

/// Returns the full 64-char lowercase hex SHA-256 signal ID.
///
/// `params_hash` is the hex string from [`crate::identity::compute_parameters_hash`].
/// Ordering of the joined fields is fixed by spec.md §4.1; changing it would
/// silently break cross-run reproducibility.
pub fn generate_signal_id(
    pair: &str,
    timestamp_utc: DateTime<Utc>,
    direction: Direction,
    entry_price: f64,
    stop_price: f64,
    position_size: f64,
    params_hash: &str,
) -> String {
    let canonical = format!(
        "{pair}|{iso_ts}|{direction}|{entry:.6}|{stop:.6}|{size:.6}|{params_hash}",
        pair = pair,
        iso_ts = timestamp_utc.to_rfc3339(),
        direction = direction,
        entry = entry_price,
        stop = stop_price,
        size = position_size,
        params_hash = params_hash,
    );
    ParamsHash::from_bytes(canonical.as_bytes()).as_hex()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn id_is_64_char_lowercase_hex() {
        let id = generate_signal_id("EURUSD", ts(), Direction::Long, 1.1000, 1.0980, 10000.0, "ph");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn id_is_deterministic() {
        let a = generate_signal_id("EURUSD", ts(), Direction::Long, 1.1000, 1.0980, 10000.0, "ph");
        let b = generate_signal_id("EURUSD", ts(), Direction::Long, 1.1000, 1.0980, 10000.0, "ph");
        assert_eq!(a, b);
    }

    #[test]
    fn changing_any_field_flips_the_id() {
        let base = generate_signal_id("EURUSD", ts(), Direction::Long, 1.1000, 1.0980, 10000.0, "ph");
        let diff_pair = generate_signal_id("USDJPY", ts(), Direction::Long, 1.1000, 1.0980, 10000.0, "ph");
        let diff_dir = generate_signal_id("EURUSD", ts(), Direction::Short, 1.1000, 1.0980, 10000.0, "ph");
        let diff_entry = generate_signal_id("EURUSD", ts(), Direction::Long, 1.1001, 1.0980, 10000.0, "ph");
        let diff_hash = generate_signal_id("EURUSD", ts(), Direction::Long, 1.1000, 1.0980, 10000.0, "ph2");
        assert_ne!(base, diff_pair);
        assert_ne!(base, diff_dir);
        assert_ne!(base, diff_entry);
        assert_ne!(base, diff_hash);
    }

    #[test]
    fn price_precision_beyond_six_decimals_is_insignificant() {
        let a = generate_signal_id("EURUSD", ts(), Direction::Long, 1.100_000_04, 1.0980, 10000.0, "ph");
        let b = generate_signal_id("EURUSD", ts(), Direction::Long, 1.100_000_01, 1.0980, 10000.0, "ph");
        assert_eq!(a, b, "both round to 1.100000 at 6dp");
    }
}
