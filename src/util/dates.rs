//! Calendar arithmetic for the weekly view.
//!
//! Weeks always start on Monday. All values are local wall-clock times
//! (`NaiveDateTime`), so no time-zone or DST shift can creep into the
//! day-distance math.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

const MS_PER_DAY: i64 = 86_400_000;

/// Monday 00:00:00.000 of the week containing `date`.
pub fn start_of_week(date: NaiveDateTime) -> NaiveDateTime {
    // Sunday is 6 days past Monday, so it rolls back to the previous Monday
    let back = i64::from(date.weekday().num_days_from_monday());
    (date.date() - TimeDelta::days(back)).and_time(NaiveTime::MIN)
}

/// Sunday 23:59:59.999 of the week containing `date`.
pub fn end_of_week(date: NaiveDateTime) -> NaiveDateTime {
    start_of_week(date) + TimeDelta::days(7) - TimeDelta::milliseconds(1)
}

/// Parse a `YYYY-MM-DD` date-input value into local noon of that day.
///
/// Exactly three integer segments are required. Out-of-range month or day
/// values roll over into the neighbouring month/year (`2025-13-01` is
/// `2026-01-01`), matching how browser date constructors normalize them.
/// Anything malformed yields `None`.
pub fn parse_date_input(text: &str) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let mut nums = [0i64; 3];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }
        *slot = part.parse::<i64>().ok()?;
    }
    let [year, month, day] = nums;

    let month_index = month - 1;
    let year = i32::try_from(year + month_index.div_euclid(12)).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first.checked_add_signed(TimeDelta::try_days(day - 1)?)?;
    date.and_hms_opt(12, 0, 0)
}

/// Format a date the way a date-input field stores it.
pub fn format_date_input(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole days from `a` to `b`, floored. Negative when `b` precedes `a`.
pub fn days_diff(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (b - a).num_milliseconds().div_euclid(MS_PER_DAY)
}

/// Clamp `n` into `[min, max]`. When `min > max`, `min` wins.
pub fn clamp(n: i64, min: i64, max: i64) -> i64 {
    n.min(max).max(min)
}

/// The seven calendar days of the week containing `anchor`, Monday first.
pub fn week_days(anchor: NaiveDateTime) -> [NaiveDate; 7] {
    let monday = start_of_week(anchor).date();
    std::array::from_fn(|i| monday + TimeDelta::days(i as i64))
}

/// Move `anchor` by whole weeks (negative goes back).
pub fn shift_weeks(anchor: NaiveDateTime, weeks: i64) -> NaiveDateTime {
    anchor + TimeDelta::weeks(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn start_of_week_is_monday_midnight() {
        // 2025-08-18 is a Monday
        for day in 17..=25 {
            let sw = start_of_week(at(2025, 8, day, 15));
            assert_eq!(sw.weekday(), Weekday::Mon);
            assert_eq!(sw.time(), NaiveTime::MIN);
        }
    }

    #[test]
    fn sunday_belongs_to_previous_week() {
        let sunday = at(2025, 8, 24, 9);
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(start_of_week(sunday).date(), NaiveDate::from_ymd_opt(2025, 8, 18).unwrap());
    }

    #[test]
    fn monday_maps_to_itself() {
        let monday = at(2025, 8, 18, 12);
        assert_eq!(start_of_week(monday).date(), monday.date());
    }

    #[test]
    fn end_of_week_is_sunday_last_millisecond() {
        let ew = end_of_week(at(2025, 8, 20, 8));
        assert_eq!(ew.weekday(), Weekday::Sun);
        assert_eq!(ew.date(), NaiveDate::from_ymd_opt(2025, 8, 24).unwrap());
        assert_eq!((ew.hour(), ew.minute(), ew.second()), (23, 59, 59));
        assert_eq!(ew.nanosecond(), 999_000_000);
    }

    #[test]
    fn week_span_is_six_days() {
        for day in 1..=31 {
            let d = at(2025, 12, day, 0);
            assert_eq!(days_diff(start_of_week(d), end_of_week(d)), 6);
        }
    }

    #[test]
    fn parse_valid_date_at_noon() {
        let d = parse_date_input("2025-08-22").unwrap();
        assert_eq!(d.year(), 2025);
        assert_eq!(d.month0(), 7);
        assert_eq!(d.day(), 22);
        assert_eq!(d.hour(), 12);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(parse_date_input(""), None);
        assert_eq!(parse_date_input("bad"), None);
        assert_eq!(parse_date_input("2025-08"), None);
        assert_eq!(parse_date_input("2025-08-22-01"), None);
        assert_eq!(parse_date_input("2025-aa-22"), None);
        assert_eq!(parse_date_input("2025-08-"), None);
    }

    #[test]
    fn parse_rolls_over_out_of_range_parts() {
        let d = parse_date_input("2025-13-01").unwrap();
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let d = parse_date_input("2025-02-30").unwrap();
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        let d = parse_date_input("2025-03-00").unwrap();
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn days_diff_floors() {
        let monday = start_of_week(at(2025, 8, 18, 0));
        assert_eq!(days_diff(monday, parse_date_input("2025-08-22").unwrap()), 4);
        assert_eq!(days_diff(monday, at(2025, 8, 17, 12)), -1);
        assert_eq!(days_diff(monday, monday), 0);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(-3, 0, 6), 0);
        assert_eq!(clamp(9, 0, 6), 6);
        assert_eq!(clamp(4, 0, 6), 4);
        assert_eq!(clamp(4, 6, 0), 6);
    }

    #[test]
    fn week_days_and_shift() {
        let days = week_days(at(2025, 8, 20, 10));
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2025, 8, 18).unwrap());
        assert_eq!(days[6], NaiveDate::from_ymd_opt(2025, 8, 24).unwrap());
        assert_eq!(format_date_input(days[4]), "2025-08-22");
        let next = shift_weeks(at(2025, 8, 20, 10), 1);
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2025, 8, 27).unwrap());
    }
}
