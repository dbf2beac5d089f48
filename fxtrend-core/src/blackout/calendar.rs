//! Deterministic news-event calendar generation (NFP, IJC), grounded on
//! `original_source/src/risk/blackout/calendar.py`. No external network
//! calls — every event is derived purely from the date range and
//! `is_us_market_holiday`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;

use super::holidays::is_us_market_holiday;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactLevel {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsEvent {
    pub event_name: String,
    pub currency: String,
    pub event_time_utc: DateTime<Utc>,
    pub impact_level: ImpactLevel,
}

const RELEASE_TIME: (u32, u32) = (8, 30);

fn to_utc(event_date: NaiveDate, local_time: NaiveTime) -> DateTime<Utc> {
    New_York
        .from_local_datetime(&event_date.and_time(local_time))
        .single()
        .expect("NFP/IJC release time is never in a DST gap/fold")
        .with_timezone(&Utc)
}

fn first_friday_of_month(year: i32, month: u32) -> NaiveDate {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let days_until = (4 + 7 - first_day.weekday().num_days_from_monday()) % 7;
    first_day + Duration::days(days_until as i64)
}

/// First Friday of each month at 08:30 ET, skipping U.S. market holidays.
pub fn generate_nfp_events(start_date: NaiveDate, end_date: NaiveDate) -> Vec<NewsEvent> {
    let mut events = Vec::new();
    let mut current = NaiveDate::from_ymd_opt(start_date.year(), start_date.month(), 1).unwrap();
    while current <= end_date {
        let nfp_date = first_friday_of_month(current.year(), current.month());
        if nfp_date >= start_date && nfp_date <= end_date && !is_us_market_holiday(nfp_date) {
            events.push(NewsEvent {
                event_name: "NFP".to_string(),
                currency: "USD".to_string(),
                event_time_utc: to_utc(nfp_date, NaiveTime::from_hms_opt(
                    RELEASE_TIME.0,
                    RELEASE_TIME.1,
                    0,
                )
                .unwrap()),
                impact_level: ImpactLevel::High,
            });
        }
        current = if current.month() == 12 {
            NaiveDate::from_ymd_opt(current.year() + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(current.year(), current.month() + 1, 1).unwrap()
        };
    }
    events
}

/// Every Thursday at 08:30 ET, skipping U.S. market holidays.
pub fn generate_ijc_events(start_date: NaiveDate, end_date: NaiveDate) -> Vec<NewsEvent> {
    let mut events = Vec::new();
    let days_until_thursday =
        (3 + 7 - start_date.weekday().num_days_from_monday()) % 7;
    let mut current = start_date + Duration::days(days_until_thursday as i64);
    while current <= end_date {
        if !is_us_market_holiday(current) {
            events.push(NewsEvent {
                event_name: "IJC".to_string(),
                currency: "USD".to_string(),
                event_time_utc: to_utc(
                    current,
                    NaiveTime::from_hms_opt(RELEASE_TIME.0, RELEASE_TIME.1, 0).unwrap(),
                ),
                impact_level: ImpactLevel::High,
            });
        }
        current += Duration::days(7);
    }
    events
}

/// Combined, chronologically sorted calendar for the requested event types.
pub fn generate_news_calendar(
    start_date: NaiveDate,
    end_date: NaiveDate,
    event_types: &[&str],
) -> Vec<NewsEvent> {
    let mut all = Vec::new();
    if event_types.contains(&"NFP") {
        all.extend(generate_nfp_events(start_date, end_date));
    }
    if event_types.contains(&"IJC") {
        all.extend(generate_ijc_events(start_date, end_date));
    }
    all.sort_by_key(|e| e.event_time_utc);
    all
}
