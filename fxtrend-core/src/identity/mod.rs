//! Identity & Reproducibility (§4.1): signal-ID factory, parameters hash,
//! and the cumulative-hash reproducibility tracker.

pub mod params_hash;
pub mod reproducibility;
pub mod signal_id;

pub use params_hash::compute_parameters_hash;
pub use reproducibility::ReproducibilityTracker;
pub use signal_id::generate_signal_id;
