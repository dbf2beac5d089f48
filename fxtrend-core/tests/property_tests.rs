//! Universal invariants and laws (property-based), in the style of the
//! teacher's `property_tests.rs`: local `arb_*` strategies feeding
//! `proptest!` blocks.
//!
//! 1. Candle OHLC ordering holds for any candle built from a sane
//!    `(open, close, wick)` triple.
//! 2. `generate_signal_id` is a pure, deterministic function of its inputs.
//! 3. `compute_parameters_hash` is order-independent over insertion order.
//! 4. The drawdown curve is non-positive everywhere and its minimum equals
//!    `max_drawdown`.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use fxtrend_core::domain::{Candle, Direction};
use fxtrend_core::identity::{compute_parameters_hash, generate_signal_id};
use fxtrend_core::metrics::{drawdown_curve, max_drawdown};

fn arb_ohlc() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (1.0f64..2.0, 0.0f64..0.01, 0.0f64..0.01).prop_map(|(base, body, wick)| {
        let open = base;
        let close = base + body;
        let high = open.max(close) + wick;
        let low = open.min(close) - wick;
        (open, high, low, close)
    })
}

fn arb_pnl_r_vec() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0f64..5.0, 0..50)
}

fn arb_param_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        ("[a-z]{1,8}", 0i64..1000).prop_map(|(k, v)| (k, v.to_string())),
        0..10,
    )
}

proptest! {
    #[test]
    fn candle_built_from_sane_triple_satisfies_ohlc_ordering((open, high, low, close) in arb_ohlc()) {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let candle = Candle::new(ts, open, high, low, close);
        prop_assert!(candle.is_sane());
        prop_assert!(candle.low <= candle.open.min(candle.close));
        prop_assert!(candle.open.max(candle.close) <= candle.high);
    }

    #[test]
    fn signal_id_is_a_pure_function_of_its_fields(
        entry in 1.0f64..2.0,
        stop in 0.9f64..1.0,
        size in 1.0f64..100_000.0,
    ) {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let a = generate_signal_id("EURUSD", ts, Direction::Long, entry, stop, size, "ph");
        let b = generate_signal_id("EURUSD", ts, Direction::Long, entry, stop, size, "ph");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn params_hash_is_independent_of_insertion_order(pairs in arb_param_pairs()) {
        let forward: BTreeMap<String, String> = pairs.iter().cloned().collect();
        let reversed: BTreeMap<String, String> = pairs.iter().rev().cloned().collect();
        prop_assert_eq!(
            compute_parameters_hash(&forward).as_hex(),
            compute_parameters_hash(&reversed).as_hex()
        );
    }

    #[test]
    fn drawdown_curve_is_non_positive_and_bottoms_out_at_max_drawdown(pnl_r in arb_pnl_r_vec()) {
        let curve = drawdown_curve(&pnl_r);
        prop_assert_eq!(curve.len(), pnl_r.len());
        for &d in &curve {
            prop_assert!(d <= 1e-9);
        }
        if !curve.is_empty() {
            let curve_min = curve.iter().cloned().fold(f64::INFINITY, f64::min);
            prop_assert!((curve_min - max_drawdown(&pnl_r)).abs() < 1e-9);
        }
    }
}
