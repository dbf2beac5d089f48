//! Blackout Engine (§4.3): three deterministic window generators (news
//! calendar, session gap, session-only whitelist complement), merged into
//! one non-overlapping window set and used to filter signal timestamps.
//!
//! Grounded on `original_source/src/risk/blackout/{holidays,calendar,sessions,windows}.py`.
//! No external network calls — calendar output depends only on the input
//! date range and configuration.

pub mod calendar;
pub mod holidays;
pub mod sessions;
pub mod windows;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::BlackoutWindow;
use crate::error::BlackoutConfigError;

pub use calendar::{generate_news_calendar, ImpactLevel, NewsEvent};
pub use sessions::{build_session_only_blackouts, get_session, TradingSession};
pub use windows::{
    expand_news_windows, expand_session_gap_windows, filter_blacked_out, is_in_blackout,
    merge_overlapping_windows,
};

fn default_true() -> bool {
    true
}
fn default_news_pre_close() -> i64 {
    10
}
fn default_news_post_pause() -> i64 {
    30
}
fn default_session_pre_close() -> i64 {
    10
}
fn default_session_post_pause() -> i64 {
    5
}
fn default_event_types() -> Vec<String> {
    vec!["NFP".to_string(), "IJC".to_string()]
}

/// Configuration for the three window generators (§6 defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutConfig {
    #[serde(default = "default_true")]
    pub news_enabled: bool,
    #[serde(default = "default_event_types")]
    pub event_types: Vec<String>,
    #[serde(default = "default_news_pre_close")]
    pub news_pre_close_minutes: i64,
    #[serde(default = "default_news_post_pause")]
    pub news_post_pause_minutes: i64,

    #[serde(default)]
    pub session_gap_enabled: bool,
    #[serde(default = "default_session_pre_close")]
    pub session_pre_close_minutes: i64,
    #[serde(default = "default_session_post_pause")]
    pub session_post_pause_minutes: i64,

    #[serde(default)]
    pub session_only_sessions: Vec<String>,
}

impl Default for BlackoutConfig {
    fn default() -> Self {
        Self {
            news_enabled: true,
            event_types: default_event_types(),
            news_pre_close_minutes: default_news_pre_close(),
            news_post_pause_minutes: default_news_post_pause(),
            session_gap_enabled: false,
            session_pre_close_minutes: default_session_pre_close(),
            session_post_pause_minutes: default_session_post_pause(),
            session_only_sessions: Vec::new(),
        }
    }
}

/// Builds the fully merged blackout window set for `[start_date, end_date]`
/// from every enabled generator in `config`.
pub fn build_windows(
    start_date: NaiveDate,
    end_date: NaiveDate,
    config: &BlackoutConfig,
) -> Result<Vec<BlackoutWindow>, BlackoutConfigError> {
    let mut all = Vec::new();

    if config.news_enabled {
        let event_types: Vec<&str> = config.event_types.iter().map(String::as_str).collect();
        let events = generate_news_calendar(start_date, end_date, &event_types);
        all.extend(expand_news_windows(
            &events,
            config.news_pre_close_minutes,
            config.news_post_pause_minutes,
        )?);
    }

    if config.session_gap_enabled {
        all.extend(expand_session_gap_windows(
            start_date,
            end_date,
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            config.session_pre_close_minutes,
            config.session_post_pause_minutes,
        )?);
    }

    if !config.session_only_sessions.is_empty() {
        all.extend(build_session_only_blackouts(
            start_date,
            end_date,
            &config.session_only_sessions,
        )?);
    }

    Ok(merge_overlapping_windows(all))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_only_news() {
        let config = BlackoutConfig::default();
        assert!(config.news_enabled);
        assert!(!config.session_gap_enabled);
        assert!(config.session_only_sessions.is_empty());
    }

    #[test]
    fn build_windows_with_all_defaults_produces_news_windows() {
        let config = BlackoutConfig::default();
        let windows = build_windows(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            &config,
        )
        .unwrap();
        assert!(!windows.is_empty());
    }

    #[test]
    fn build_windows_merges_across_generators() {
        let config = BlackoutConfig {
            session_gap_enabled: true,
            ..BlackoutConfig::default()
        };
        let windows = build_windows(
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 6).unwrap(),
            &config,
        )
        .unwrap();
        // windows are sorted and non-overlapping after merge
        for pair in windows.windows(2) {
            assert!(pair[0].end_utc < pair[1].start_utc || pair[0].end_utc == pair[1].start_utc);
        }
    }
}
