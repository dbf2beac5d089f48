//! Trading-session definitions and session-only blackout construction,
//! grounded on `original_source/src/risk/blackout/sessions.py`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::{BlackoutWindow, WindowSource};
use crate::error::BlackoutConfigError;

pub struct TradingSession {
    pub name: &'static str,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub timezone: Tz,
}

impl TradingSession {
    /// UTC `(start, end)` window for this session on `trading_date`.
    pub fn utc_window(&self, trading_date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self
            .timezone
            .from_local_datetime(&trading_date.and_time(self.start_time))
            .single()
            .expect("session open is never in a DST gap/fold");
        let end = self
            .timezone
            .from_local_datetime(&trading_date.and_time(self.end_time))
            .single()
            .expect("session close is never in a DST gap/fold");
        (start.with_timezone(&Utc), end.with_timezone(&Utc))
    }
}

fn session(name: &'static str, start: (u32, u32), end: (u32, u32), tz: Tz) -> TradingSession {
    TradingSession {
        name,
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        timezone: tz,
    }
}

/// Session name lookup, case-insensitive: NY, LONDON, ASIA, SYDNEY.
pub fn get_session(name: &str) -> Option<TradingSession> {
    match name.to_uppercase().as_str() {
        "NY" => Some(session("New York", (8, 0), (17, 0), chrono_tz::America::New_York)),
        "LONDON" => Some(session("London", (8, 0), (16, 0), chrono_tz::Europe::London)),
        "ASIA" => Some(session("Asian", (9, 0), (18, 0), chrono_tz::Asia::Tokyo)),
        "SYDNEY" => Some(session(
            "Sydney",
            (7, 0),
            (16, 0),
            chrono_tz::Australia::Sydney,
        )),
        _ => None,
    }
}

/// UTC windows of ALLOWED trading time for the given sessions, one per
/// weekday in range, overlapping sessions merged.
pub fn allowed_session_windows(
    start_date: NaiveDate,
    end_date: NaiveDate,
    allowed_sessions: &[String],
) -> Result<Vec<BlackoutWindow>, BlackoutConfigError> {
    if allowed_sessions.is_empty() {
        return Ok(Vec::new());
    }
    let sessions: Vec<TradingSession> = allowed_sessions
        .iter()
        .map(|name| get_session(name).ok_or_else(|| BlackoutConfigError::MalformedTime(name.clone())))
        .collect::<Result<_, _>>()?;

    let mut all_windows = Vec::new();
    let mut current = start_date;
    while current <= end_date {
        if current.weekday().num_days_from_monday() < 5 {
            for s in &sessions {
                let (start, end) = s.utc_window(current);
                all_windows.push(BlackoutWindow::new(start, end, WindowSource::SessionOnly)?);
            }
        }
        current += Duration::days(1);
    }

    Ok(super::windows::merge_overlapping_windows(all_windows))
}

/// Blackout windows for times OUTSIDE the allowed sessions — the complement
/// of [`allowed_session_windows`] over `[start_date 00:00 UTC, end_date+1 00:00 UTC)`.
pub fn build_session_only_blackouts(
    start_date: NaiveDate,
    end_date: NaiveDate,
    allowed_sessions: &[String],
) -> Result<Vec<BlackoutWindow>, BlackoutConfigError> {
    if allowed_sessions.is_empty() {
        return Ok(Vec::new());
    }
    let mut allowed = allowed_session_windows(start_date, end_date, allowed_sessions)?;
    if allowed.is_empty() {
        return Ok(Vec::new());
    }
    allowed.sort_by_key(|w| w.start_utc);

    let mut blackouts = Vec::new();
    let day_start = Utc.from_utc_datetime(&start_date.and_hms_opt(0, 0, 0).unwrap());
    if allowed[0].start_utc > day_start {
        blackouts.push(BlackoutWindow::new(
            day_start,
            allowed[0].start_utc,
            WindowSource::SessionOnly,
        )?);
    }
    for i in 0..allowed.len() - 1 {
        let current_end = allowed[i].end_utc;
        let next_start = allowed[i + 1].start_utc;
        if next_start > current_end {
            blackouts.push(BlackoutWindow::new(
                current_end,
                next_start,
                WindowSource::SessionOnly,
            )?);
        }
    }
    let day_end = Utc.from_utc_datetime(
        &(end_date + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap(),
    );
    let last_end = allowed.last().unwrap().end_utc;
    if last_end < day_end {
        blackouts.push(BlackoutWindow::new(last_end, day_end, WindowSource::SessionOnly)?);
    }
    Ok(blackouts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn unknown_session_name_is_rejected() {
        assert!(get_session("MARS").is_none());
    }

    #[test]
    fn session_lookup_is_case_insensitive() {
        assert!(get_session("ny").is_some());
        assert!(get_session("Ny").is_some());
    }

    #[test]
    fn weekends_produce_no_allowed_windows() {
        // Jan 7-8 2023 is a Sat/Sun.
        let windows = allowed_session_windows(d(2023, 1, 7), d(2023, 1, 8), &["NY".into()]).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn session_only_blackout_covers_the_gaps() {
        let blackouts =
            build_session_only_blackouts(d(2023, 1, 2), d(2023, 1, 2), &["NY".into()]).unwrap();
        assert!(!blackouts.is_empty());
    }

    #[test]
    fn empty_allowed_sessions_yields_no_blackouts() {
        let blackouts = build_session_only_blackouts(d(2023, 1, 2), d(2023, 1, 2), &[]).unwrap();
        assert!(blackouts.is_empty());
    }
}
