//! Calendar-aware date arithmetic.
//!
//! All operations go through a [`Calendar`], which carries the first day of
//! the week and the UTC offset that define what a "day", "week", or "month"
//! is for the user.  Dates are wall-clock [`PrimitiveDateTime`]s in that
//! offset.  None of the operations fail: a computation that would leave the
//! range of dates supported by `time` returns the input date unchanged.
mod relative;
mod util;
pub use self::relative::Relative;
use self::util::{add_months, days_in_month, iter_days_after, WeekdayExt, DAYS_IN_WEEK};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{
    macros::time, Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    Weekday,
};

/// Time of day used for the end of a day, week, month, or year
const END_OF_DAY: Time = time!(23:59:59);

/// A unit of calendar time
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Unit {
    Day,
    Week,
    Month,
    Year,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Day => write!(f, "day"),
            Unit::Week => write!(f, "week"),
            Unit::Month => write!(f, "month"),
            Unit::Year => write!(f, "year"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Calendar {
    first_weekday: Weekday,
    offset: UtcOffset,
}

impl Default for Calendar {
    fn default() -> Calendar {
        Calendar::new(Weekday::Sunday, UtcOffset::UTC)
    }
}

impl Calendar {
    pub const fn new(first_weekday: Weekday, offset: UtcOffset) -> Calendar {
        Calendar {
            first_weekday,
            offset,
        }
    }

    /// Returns a Sunday-first calendar in the host's current UTC offset
    pub fn local() -> Result<Calendar, CalendarError> {
        let offset =
            UtcOffset::current_local_offset().map_err(|_| CalendarError::IndeterminateOffset)?;
        Ok(Calendar::default().with_offset(offset))
    }

    #[must_use]
    pub const fn with_first_weekday(mut self, first_weekday: Weekday) -> Calendar {
        self.first_weekday = first_weekday;
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: UtcOffset) -> Calendar {
        self.offset = offset;
        self
    }

    pub const fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// The current wall-clock time in the calendar's offset
    pub fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }

    /// Milliseconds since the Unix epoch of the wall-clock time `date`
    pub fn timestamp_millis(&self, date: PrimitiveDateTime) -> i128 {
        date.assume_offset(self.offset).unix_timestamp_nanos() / 1_000_000
    }

    /// Seconds since the Unix epoch of the wall-clock time `date`
    pub fn timestamp(&self, date: PrimitiveDateTime) -> i64 {
        date.assume_offset(self.offset).unix_timestamp()
    }

    pub fn start_of(&self, date: PrimitiveDateTime, unit: Unit) -> PrimitiveDateTime {
        let day = match unit {
            Unit::Day => Some(date.date()),
            Unit::Week => self.week_start(date.date()),
            Unit::Month => date.date().replace_day(1).ok(),
            Unit::Year => Date::from_calendar_date(date.year(), Month::January, 1).ok(),
        };
        day.map_or(date, |d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
    }

    pub fn end_of(&self, date: PrimitiveDateTime, unit: Unit) -> PrimitiveDateTime {
        let day = match unit {
            Unit::Day => Some(date.date()),
            Unit::Week => self
                .week_start(date.date())
                .and_then(|d| d.checked_add(Duration::days(6))),
            Unit::Month => days_in_month(date.year(), date.month())
                .and_then(|last| date.date().replace_day(last).ok()),
            Unit::Year => Date::from_calendar_date(date.year(), Month::December, 31).ok(),
        };
        day.map_or(date, |d| PrimitiveDateTime::new(d, END_OF_DAY))
    }

    pub fn start_of_day(&self, date: PrimitiveDateTime) -> PrimitiveDateTime {
        self.start_of(date, Unit::Day)
    }

    pub fn start_of_month(&self, date: PrimitiveDateTime) -> PrimitiveDateTime {
        self.start_of(date, Unit::Month)
    }

    pub fn end_of_month(&self, date: PrimitiveDateTime) -> PrimitiveDateTime {
        self.end_of(date, Unit::Month)
    }

    /// Shifts `date` by `amount` units.
    ///
    /// Month and year shifts keep the day of the month where possible and
    /// otherwise clamp it to the last day of the target month, so that
    /// January 31 plus one month is the last day of February.
    pub fn shift(&self, date: PrimitiveDateTime, amount: i64, unit: Unit) -> PrimitiveDateTime {
        let shifted = match unit {
            Unit::Day => date.checked_add(Duration::days(amount)),
            Unit::Week => date.checked_add(Duration::weeks(amount)),
            Unit::Month => add_months(date, amount),
            Unit::Year => amount.checked_mul(12).and_then(|m| add_months(date, m)),
        };
        shifted.unwrap_or(date)
    }

    pub fn same_unit(&self, a: PrimitiveDateTime, b: PrimitiveDateTime, unit: Unit) -> bool {
        match unit {
            Unit::Day => a.date() == b.date(),
            Unit::Week => self.week_start(a.date()) == self.week_start(b.date()),
            Unit::Month => (a.year(), a.month()) == (b.year(), b.month()),
            Unit::Year => a.year() == b.year(),
        }
    }

    pub fn same_day(&self, a: PrimitiveDateTime, b: PrimitiveDateTime) -> bool {
        self.same_unit(a, b, Unit::Day)
    }

    /// Returns the seven dates of the week containing `date`, starting with
    /// the calendar's first weekday.  Each entry keeps the time of day of
    /// `date`.
    pub fn week_of(&self, date: PrimitiveDateTime) -> [PrimitiveDateTime; 7] {
        let index = i64::from(date.weekday().index_from(self.first_weekday));
        let mut week = [date; 7];
        for (k, slot) in (0i64..).zip(week.iter_mut()) {
            *slot = self.shift(date, k - index, Unit::Day);
        }
        week
    }

    /// Returns one date for every week that overlaps the month containing
    /// `date`: the first of the month, then each following week, up to and
    /// including the week that contains the last day of the month
    pub fn one_day_per_week_of_month(&self, date: PrimitiveDateTime) -> Vec<PrimitiveDateTime> {
        let first = self.start_of_month(date);
        let last = self.end_of_month(date);
        let mut dates = vec![first];
        let mut current = first;
        loop {
            let next = self.shift(current, 1, Unit::Week);
            if next == current {
                // Ran out of representable dates
                break;
            }
            current = next;
            let is_last_week = self
                .week_of(current)
                .iter()
                .any(|&d| self.same_day(d, last));
            dates.push(current);
            if is_last_week {
                break;
            }
        }
        dates
    }

    /// Returns every day of the month containing `date` at midnight
    pub fn days_of_month(&self, date: PrimitiveDateTime) -> Vec<PrimitiveDateTime> {
        let first = self.start_of_month(date);
        let length = usize::from(self.last_day_of_month(date));
        std::iter::once(first.date())
            .chain(iter_days_after(first.date()))
            .take(length)
            .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
            .collect()
    }

    /// Whether the week containing `date` also contains days from another
    /// month
    pub fn week_spans_months(&self, date: PrimitiveDateTime) -> bool {
        let week = self.week_of(date);
        week.iter().any(|d| d.month() != date.month())
    }

    pub fn day_of_year(&self, date: PrimitiveDateTime) -> u16 {
        date.ordinal()
    }

    pub fn first_day_of_month(&self, date: PrimitiveDateTime) -> u8 {
        self.start_of_month(date).day()
    }

    pub fn last_day_of_month(&self, date: PrimitiveDateTime) -> u8 {
        self.end_of_month(date).day()
    }

    /// Returns the week number of `date` within its year, where week 1 is the
    /// week containing January 1.  The last days of December belong to week 1
    /// of the following year when they share a week with its January 1.
    pub fn week_of_year(&self, date: PrimitiveDateTime) -> u8 {
        let Some(start) = self.week_start(date.date()) else {
            return 1;
        };
        match start.checked_add(Duration::days(6)) {
            Some(end) if end.year() > date.year() => return 1,
            None => return 1,
            _ => (),
        }
        let Some(first_start) = Date::from_calendar_date(date.year(), Month::January, 1)
            .ok()
            .and_then(|jan1| self.week_start(jan1))
        else {
            return 1;
        };
        let weeks = (start - first_start).whole_weeks();
        u8::try_from(weeks + 1).unwrap_or(u8::MAX)
    }

    /// Returns the dates in `dates` that fall in the same week as `date`
    pub fn dates_in_same_week(
        &self,
        dates: &[PrimitiveDateTime],
        date: PrimitiveDateTime,
    ) -> Vec<PrimitiveDateTime> {
        dates
            .iter()
            .copied()
            .filter(|&d| self.same_unit(d, date, Unit::Week))
            .collect()
    }

    pub fn contains_same_day(&self, dates: &[PrimitiveDateTime], date: PrimitiveDateTime) -> bool {
        dates.iter().any(|&d| self.same_day(d, date))
    }

    fn week_start(&self, date: Date) -> Option<Date> {
        let index = date.weekday().index_from(self.first_weekday);
        date.checked_sub(Duration::days(i64::from(index)))
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CalendarError {
    #[error("failed to determine local UTC offset")]
    IndeterminateOffset,
}

/// A [`Weekday`] that can be parsed from its English name or a prefix of at
/// least two letters of it, case-insensitively
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WeekdayArg(pub Weekday);

impl FromStr for WeekdayArg {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<WeekdayArg, ParseWeekdayError> {
        let needle = s.trim().to_ascii_lowercase();
        if needle.len() >= 2 {
            let mut wd = Weekday::Sunday;
            for _ in 0..DAYS_IN_WEEK {
                if wd.to_string().to_ascii_lowercase().starts_with(&needle) {
                    return Ok(WeekdayArg(wd));
                }
                wd = wd.next();
            }
        }
        Err(ParseWeekdayError(s.to_owned()))
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid weekday: {0:?}")]
pub struct ParseWeekdayError(String);
