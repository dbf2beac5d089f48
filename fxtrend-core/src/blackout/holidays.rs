//! U.S. market holiday detection (NYSE calendar), grounded on
//! `original_source/src/risk/blackout/holidays.py`.

use chrono::{Datelike, NaiveDate, Weekday};

fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let days_until = (7 + weekday.num_days_from_monday()
        - first_day.weekday().num_days_from_monday())
        % 7;
    first_day + chrono::Duration::days(days_until as i64 + 7 * (n as i64 - 1))
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let last_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - chrono::Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - chrono::Duration::days(1)
    };
    let days_back = (7 + last_day.weekday().num_days_from_monday()
        - weekday.num_days_from_monday())
        % 7;
    last_day - chrono::Duration::days(days_back as i64)
}

/// Anonymous Gregorian algorithm.
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("valid easter date")
}

fn observed_date(holiday: NaiveDate) -> NaiveDate {
    match holiday.weekday() {
        Weekday::Sat => holiday - chrono::Duration::days(1),
        Weekday::Sun => holiday + chrono::Duration::days(1),
        _ => holiday,
    }
}

/// All NYSE holidays for `year`, sorted ascending.
pub fn us_holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let mut holidays = vec![
        observed_date(NaiveDate::from_ymd_opt(year, 1, 1).unwrap()),
        nth_weekday_of_month(year, 1, Weekday::Mon, 3),
        nth_weekday_of_month(year, 2, Weekday::Mon, 3),
        easter_sunday(year) - chrono::Duration::days(2),
        last_weekday_of_month(year, 5, Weekday::Mon),
        observed_date(NaiveDate::from_ymd_opt(year, 7, 4).unwrap()),
        nth_weekday_of_month(year, 9, Weekday::Mon, 1),
        nth_weekday_of_month(year, 11, Weekday::Thu, 4),
        observed_date(NaiveDate::from_ymd_opt(year, 12, 25).unwrap()),
    ];
    if year >= 2021 {
        holidays.push(observed_date(NaiveDate::from_ymd_opt(year, 6, 19).unwrap()));
    }
    holidays.sort();
    holidays
}

pub fn is_us_market_holiday(check_date: NaiveDate) -> bool {
    us_holidays_for_year(check_date.year()).contains(&check_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independence_day_2023_is_a_holiday() {
        assert!(is_us_market_holiday(
            NaiveDate::from_ymd_opt(2023, 7, 4).unwrap()
        ));
    }

    #[test]
    fn ordinary_march_day_is_not_a_holiday() {
        assert!(!is_us_market_holiday(
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        ));
    }

    #[test]
    fn juneteenth_only_a_holiday_from_2021() {
        assert!(!is_us_market_holiday(
            NaiveDate::from_ymd_opt(2020, 6, 19).unwrap()
        ));
        assert!(is_us_market_holiday(
            NaiveDate::from_ymd_opt(2021, 6, 19).unwrap()
        ));
    }

    #[test]
    fn each_year_has_at_least_ten_holidays() {
        assert!(us_holidays_for_year(2023).len() >= 10);
    }

    #[test]
    fn weekend_holiday_is_observed_on_adjacent_weekday() {
        // July 4 2026 falls on a Saturday; observed Friday July 3.
        let observed = observed_date(NaiveDate::from_ymd_opt(2026, 7, 4).unwrap());
        assert_eq!(observed, NaiveDate::from_ymd_opt(2026, 7, 3).unwrap());
    }

    #[test]
    fn good_friday_precedes_easter_by_two_days() {
        let holidays = us_holidays_for_year(2023);
        let easter = easter_sunday(2023);
        assert!(holidays.contains(&(easter - chrono::Duration::days(2))));
    }
}
