use std::iter::successors;
use time::{Date, Month, PrimitiveDateTime, Weekday};

pub(crate) const DAYS_IN_WEEK: u8 = 7;

pub(crate) trait WeekdayExt {
    /// Position of the weekday in a week that begins on `first`, from 0 to 6
    fn index_from(&self, first: Weekday) -> u8;
}

impl WeekdayExt for Weekday {
    fn index_from(&self, first: Weekday) -> u8 {
        (self.number_days_from_sunday() + DAYS_IN_WEEK - first.number_days_from_sunday())
            % DAYS_IN_WEEK
    }
}

/// Returns the number of days in the given month, or `None` if the year is
/// outside the range supported by `time`
pub(crate) fn days_in_month(year: i32, month: Month) -> Option<u8> {
    (28..=31)
        .rev()
        .find(|&day| Date::from_calendar_date(year, month, day).is_ok())
}

/// Adds a signed number of months to `dt`, clamping the day of the month to
/// the length of the target month and preserving the time of day
pub(crate) fn add_months(dt: PrimitiveDateTime, months: i64) -> Option<PrimitiveDateTime> {
    let date = dt.date();
    let total = i64::from(date.year())
        .checked_mul(12)?
        .checked_add(i64::from(u8::from(date.month())) - 1)?
        .checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u8::try_from(total.rem_euclid(12) + 1).ok()?;
    let month = Month::try_from(month).ok()?;
    let day = date.day().min(days_in_month(year, month)?);
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(dt.replace_date(date))
}

pub(crate) fn iter_days_after(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day()).skip(1)
}
