//! Window expansion, merge, and filtering, grounded on
//! `original_source/src/risk/blackout/windows.py`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::calendar::NewsEvent;
use crate::domain::{BlackoutWindow, WindowSource};
use crate::error::BlackoutConfigError;

/// Expands each news event into `(event_time - pre_close, event_time + post_pause)`.
pub fn expand_news_windows(
    events: &[NewsEvent],
    pre_close_minutes: i64,
    post_pause_minutes: i64,
) -> Result<Vec<BlackoutWindow>, BlackoutConfigError> {
    events
        .iter()
        .map(|event| {
            let start = event.event_time_utc - Duration::minutes(pre_close_minutes);
            let end = event.event_time_utc + Duration::minutes(post_pause_minutes);
            BlackoutWindow::new(start, end, WindowSource::News)
        })
        .collect()
}

/// Session-gap windows: `NY close - pre_close` to `next-day Asian open + post_pause`,
/// one per weekday, skipping Sat/Sun.
pub fn expand_session_gap_windows(
    start_date: NaiveDate,
    end_date: NaiveDate,
    ny_close: NaiveTime,
    asian_open: NaiveTime,
    pre_close_minutes: i64,
    post_pause_minutes: i64,
) -> Result<Vec<BlackoutWindow>, BlackoutConfigError> {
    let ny_tz: Tz = chrono_tz::America::New_York;
    let asian_tz: Tz = chrono_tz::Asia::Tokyo;

    let mut windows = Vec::new();
    let mut current = start_date;
    while current <= end_date {
        if current.weekday().num_days_from_monday() < 5 {
            let ny_close_local = ny_tz
                .from_local_datetime(&current.and_time(ny_close))
                .single()
                .expect("NY close is never in a DST gap/fold");
            let window_start = ny_close_local - Duration::minutes(pre_close_minutes);

            let next_day = current + Duration::days(1);
            let asian_open_local = asian_tz
                .from_local_datetime(&next_day.and_time(asian_open))
                .single()
                .expect("Asian open is never in a DST gap/fold");
            let window_end = asian_open_local + Duration::minutes(post_pause_minutes);

            windows.push(BlackoutWindow::new(
                window_start.with_timezone(&Utc),
                window_end.with_timezone(&Utc),
                WindowSource::Session,
            )?);
        }
        current += Duration::days(1);
    }
    Ok(windows)
}

/// Single-pass interval union: touching or overlapping windows coalesce;
/// `source` becomes `News` if any contributing window is `News`.
pub fn merge_overlapping_windows(windows: Vec<BlackoutWindow>) -> Vec<BlackoutWindow> {
    if windows.is_empty() {
        return Vec::new();
    }
    let mut sorted = windows;
    sorted.sort_by_key(|w| w.start_utc);

    let mut merged = Vec::new();
    let mut current_start = sorted[0].start_utc;
    let mut current_end = sorted[0].end_utc;
    let mut current_source = sorted[0].source;

    for w in sorted.into_iter().skip(1) {
        if w.start_utc <= current_end {
            current_end = current_end.max(w.end_utc);
            if matches!(w.source, WindowSource::News) || matches!(current_source, WindowSource::News)
            {
                current_source = WindowSource::News;
            }
        } else {
            merged.push(BlackoutWindow {
                start_utc: current_start,
                end_utc: current_end,
                source: current_source,
            });
            current_start = w.start_utc;
            current_end = w.end_utc;
            current_source = w.source;
        }
    }
    merged.push(BlackoutWindow {
        start_utc: current_start,
        end_utc: current_end,
        source: current_source,
    });
    merged
}

pub fn is_in_blackout(timestamp: DateTime<Utc>, windows: &[BlackoutWindow]) -> bool {
    windows.iter().any(|w| w.contains(timestamp))
}

/// Given signal indices and matching timestamps, returns `(filtered_indices,
/// blocked_count)` — indices whose timestamp falls in no window, plus a
/// count of how many were blocked (§4.3).
pub fn filter_blacked_out(
    indices: &[usize],
    timestamps: &[DateTime<Utc>],
    windows: &[BlackoutWindow],
) -> (Vec<usize>, usize) {
    let mut filtered = Vec::new();
    let mut blocked = 0;
    for (&idx, &ts) in indices.iter().zip(timestamps.iter()) {
        if is_in_blackout(ts, windows) {
            blocked += 1;
        } else {
            filtered.push(idx);
        }
    }
    (filtered, blocked)
}
