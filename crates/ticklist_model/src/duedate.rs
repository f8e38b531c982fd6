//! Due-date string parsing.
//!
//! Accepted forms, tried in order:
//! - `"N"` (up to 3 digits): due N days from today, 1..=[`MAX_DAYS_OFFSET`]
//! - `"M/D/YYYY"` and `"M/D/YY"`: explicit dates
//! - `"M/D"`: this year, or next year if the date has already passed
//!
//! Every accepted form resolves to 23:59:59 local time on the target day.
//! Anything else (including `"0"` and negative offsets) parses to 0, which
//! the rest of the system reads as "no due date".

use crate::MAX_DAYS_OFFSET;
use chrono::{Datelike, Days, Local, Months, NaiveDate};

/// Parses a due-date string into a unix timestamp, 0 if unparseable.
pub fn parse_due_date(input: &str) -> i64 {
    let input = input.trim();
    if input.is_empty() {
        return 0;
    }
    let today = Local::now().date_naive();
    resolve(input, today).map(end_of_day_ts).unwrap_or(0)
}

/// Resolves an input string to a calendar date relative to `today`.
fn resolve(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    if input.len() <= 3 {
        if let Ok(days) = input.parse::<i64>() {
            if days > 0 && days <= MAX_DAYS_OFFSET {
                return today.checked_add_days(Days::new(days as u64));
            }
        }
    }

    for format in ["%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            if in_reasonable_range(date, today) {
                return Some(date);
            }
        }
    }

    resolve_month_day(input, today)
}

/// Resolves a `"M/D"` input to the nearest matching future date.
fn resolve_month_day(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (month_str, day_str) = input.split_once('/')?;
    let month: u32 = month_str.parse().ok()?;
    let day: u32 = day_str.parse().ok()?;

    let year = if today.month() > month || (today.month() == month && today.day() > day) {
        today.year() + 1
    } else {
        today.year()
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    in_reasonable_range(date, today).then_some(date)
}

/// Accepts dates from one year in the past (historical tracking) up to
/// [`MAX_DAYS_OFFSET`] days ahead.
fn in_reasonable_range(date: NaiveDate, today: NaiveDate) -> bool {
    let earliest = today.checked_sub_months(Months::new(12));
    let latest = today.checked_add_days(Days::new(MAX_DAYS_OFFSET as u64));
    match (earliest, latest) {
        (Some(earliest), Some(latest)) => date >= earliest && date <= latest,
        _ => false,
    }
}

/// Converts a date to the timestamp of 23:59:59 local time on that day.
fn end_of_day_ts(date: NaiveDate) -> i64 {
    date.and_hms_opt(23, 59, 59)
        .and_then(|dt| dt.and_local_timezone(Local).earliest())
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Timelike};

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn empty_and_invalid_inputs() {
        for input in ["", "invalid", "abc", "13/32/2025", "-1", "0"] {
            assert_eq!(parse_due_date(input), 0, "input {input:?}");
        }
    }

    #[test]
    fn day_offsets() {
        let today = fixed_today();
        assert_eq!(
            resolve("1", today),
            NaiveDate::from_ymd_opt(2025, 6, 11)
        );
        assert_eq!(
            resolve("3", today),
            NaiveDate::from_ymd_opt(2025, 6, 13)
        );
        assert_eq!(
            resolve("30", today),
            NaiveDate::from_ymd_opt(2025, 7, 10)
        );
        assert_eq!(
            resolve("999", today),
            today.checked_add_days(Days::new(999))
        );
    }

    #[test]
    fn day_offset_rejects_non_positive() {
        let today = fixed_today();
        assert_eq!(resolve("0", today), None);
        assert_eq!(resolve("-1", today), None);
    }

    #[test]
    fn full_date_format() {
        let today = fixed_today();
        assert_eq!(
            resolve("12/25/2025", today),
            NaiveDate::from_ymd_opt(2025, 12, 25)
        );
        assert_eq!(
            resolve("1/1/2026", today),
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
        assert_eq!(
            resolve("6/15/2025", today),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
    }

    #[test]
    fn short_year_format() {
        let today = fixed_today();
        assert_eq!(
            resolve("12/25/25", today),
            NaiveDate::from_ymd_opt(2025, 12, 25)
        );
        assert_eq!(
            resolve("6/15/30", today),
            NaiveDate::from_ymd_opt(2030, 6, 15)
        );
    }

    #[test]
    fn month_day_rolls_to_next_year_when_past() {
        let today = fixed_today(); // 2025-06-10
        assert_eq!(
            resolve("6/15", today),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
        assert_eq!(
            resolve("6/5", today),
            NaiveDate::from_ymd_opt(2026, 6, 5)
        );
        assert_eq!(
            resolve("1/2", today),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
    }

    #[test]
    fn rejects_dates_outside_reasonable_range() {
        let today = fixed_today();
        assert_eq!(resolve("1/1/1990", today), None);
        assert_eq!(resolve("1/1/2300", today), None);
        // A year back is still accepted for historical tracking.
        assert_eq!(
            resolve("12/25/2024", today),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
    }

    #[test]
    fn timestamps_land_on_end_of_day() {
        for input in ["1", "12/25/2025"] {
            let ts = parse_due_date(input);
            assert_ne!(ts, 0, "input {input:?}");
            let local = DateTime::from_timestamp(ts, 0)
                .unwrap()
                .with_timezone(&Local);
            assert_eq!(local.hour(), 23);
            assert_eq!(local.minute(), 59);
            assert_eq!(local.second(), 59);
        }
    }

    #[test]
    fn offset_lands_on_expected_day() {
        let ts = parse_due_date("3");
        let expected = Local::now()
            .date_naive()
            .checked_add_days(Days::new(3))
            .unwrap();
        let local = DateTime::from_timestamp(ts, 0)
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(local, expected);
    }
}
