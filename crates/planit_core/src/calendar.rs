//! Calendar-strip helpers for the current month.
//!
//! The registry keys by bare day-of-month; these helpers only decide which
//! days the strip shows and how each is labelled.

use crate::clock::Clock;
use crate::model::schedule::{Day, TaskValidationError};
use chrono::{Datelike, NaiveDate};

/// One cell of the calendar strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub day: Day,
    /// Abbreviated English weekday, e.g. `Mon`.
    pub weekday: String,
}

/// Number of days in `month` of `year`, or `None` for an invalid month.
pub fn month_length(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next_first.signed_duration_since(first).num_days()).ok()
}

/// Strip cells for every day of `month` in `year`.
pub fn month_days(year: i32, month: u32) -> Option<Vec<CalendarDay>> {
    let length = month_length(year, month)?;
    (1..=length)
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(CalendarDay {
                day: Day::new(day).ok()?,
                weekday: date.format("%a").to_string(),
            })
        })
        .collect()
}

/// Strip cells for the clock's current month.
pub fn current_month_days(clock: &dyn Clock) -> Vec<CalendarDay> {
    let today = clock.now().date();
    month_days(today.year(), today.month()).unwrap_or_default()
}

/// Today's registry key.
pub fn today(clock: &dyn Clock) -> Result<Day, TaskValidationError> {
    Day::new(clock.now().day())
}

#[cfg(test)]
mod tests {
    use super::{current_month_days, month_days, month_length, today};
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    #[test]
    fn month_length_handles_leap_february_and_december() {
        assert_eq!(month_length(2024, 2), Some(29));
        assert_eq!(month_length(2026, 2), Some(28));
        assert_eq!(month_length(2026, 12), Some(31));
        assert_eq!(month_length(2026, 13), None);
    }

    #[test]
    fn month_days_labels_weekdays() {
        let days = month_days(2026, 10).unwrap();
        assert_eq!(days.len(), 31);
        assert_eq!(days[0].day.get(), 1);
        assert_eq!(days[0].weekday, "Thu");
        assert_eq!(days[18].weekday, "Mon");
    }

    #[test]
    fn clock_drives_current_month_and_today() {
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2026, 2, 14)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        assert_eq!(current_month_days(&clock).len(), 28);
        assert_eq!(today(&clock).unwrap().get(), 14);
    }
}
