use super::{Calendar, Unit};
use time::PrimitiveDateTime;

/// How a date relates to "now", from the nearest day outwards.  This is the
/// classification behind human-friendly titles such as "Tomorrow" or "In 3
/// weeks"; turning it into text is left to the caller.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Relative {
    Yesterday,
    Today,
    Tomorrow,
    Years(i32),
    Months(i32),
    Weeks(i32),
    ThisWeek,
}

impl Calendar {
    pub fn is_yesterday(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        now.date().previous_day() == Some(date.date())
    }

    pub fn is_today(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        self.same_day(date, now)
    }

    pub fn is_tomorrow(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        now.date().next_day() == Some(date.date())
    }

    pub fn is_this_week(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        self.same_unit(date, now, Unit::Week)
    }

    pub fn is_this_month(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        self.same_unit(date, now, Unit::Month)
    }

    pub fn is_this_year(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        self.same_unit(date, now, Unit::Year)
    }

    /// True if `date` is before `now` and not on the same day
    pub fn is_past_day(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        !self.is_today(date, now) && date < now
    }

    pub fn years_from(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> i32 {
        date.year() - now.year()
    }

    /// Difference between the month numbers of `date` and `now`.
    ///
    /// The years are not taken into account, so a November date compared to
    /// the following January gives 10 rather than -2.  [`Calendar::relative`]
    /// only consults this when the years already agree.
    pub fn months_from(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> i32 {
        i32::from(u8::from(date.month())) - i32::from(u8::from(now.month()))
    }

    /// Difference between the [week-of-year](Calendar::week_of_year) numbers
    /// of `date` and `now`.
    ///
    /// As with [`Calendar::months_from`], the years are ignored.  A late
    /// December date that already counts as week 1 therefore compares as
    /// being in the first week of its own year.
    pub fn weeks_from(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> i32 {
        i32::from(self.week_of_year(date)) - i32::from(self.week_of_year(now))
    }

    pub fn relative(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> Relative {
        if self.is_yesterday(date, now) {
            return Relative::Yesterday;
        }
        if self.is_today(date, now) {
            return Relative::Today;
        }
        if self.is_tomorrow(date, now) {
            return Relative::Tomorrow;
        }
        match self.years_from(date, now) {
            0 => (),
            n => return Relative::Years(n),
        }
        match self.months_from(date, now) {
            0 => (),
            n => return Relative::Months(n),
        }
        match self.weeks_from(date, now) {
            0 => Relative::ThisWeek,
            n => Relative::Weeks(n),
        }
    }

    /// Whether `date` and `now` fall on consecutive or identical days
    pub fn is_near_today(&self, date: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        self.is_yesterday(date, now) || self.is_today(date, now) || self.is_tomorrow(date, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: PrimitiveDateTime = datetime!(2024-06-12 15:00);

    #[test]
    fn test_nearby_days() {
        let cal = Calendar::default();
        assert!(cal.is_yesterday(datetime!(2024-06-11 23:59), NOW));
        assert!(cal.is_today(datetime!(2024-06-12 00:00), NOW));
        assert!(cal.is_tomorrow(datetime!(2024-06-13 08:00), NOW));
        assert!(!cal.is_tomorrow(datetime!(2024-06-14 00:00), NOW));
        assert!(cal.is_near_today(datetime!(2024-06-13 08:00), NOW));
        assert!(!cal.is_near_today(datetime!(2024-06-10 08:00), NOW));
    }

    #[test]
    fn test_is_past_day() {
        let cal = Calendar::default();
        assert!(cal.is_past_day(datetime!(2024-06-11 23:59), NOW));
        assert!(!cal.is_past_day(datetime!(2024-06-12 01:00), NOW));
        assert!(!cal.is_past_day(datetime!(2024-06-13 01:00), NOW));
    }

    #[test]
    fn test_this_week_month_year() {
        let cal = Calendar::default();
        assert!(cal.is_this_week(datetime!(2024-06-15 00:00), NOW));
        assert!(!cal.is_this_week(datetime!(2024-06-16 00:00), NOW));
        assert!(cal.is_this_month(datetime!(2024-06-30 00:00), NOW));
        assert!(!cal.is_this_month(datetime!(2023-06-12 00:00), NOW));
        assert!(cal.is_this_year(datetime!(2024-01-01 00:00), NOW));
    }

    #[test]
    fn test_relative() {
        let cal = Calendar::default();
        assert_eq!(cal.relative(datetime!(2024-06-11 09:00), NOW), Relative::Yesterday);
        assert_eq!(cal.relative(datetime!(2024-06-12 09:00), NOW), Relative::Today);
        assert_eq!(cal.relative(datetime!(2024-06-13 09:00), NOW), Relative::Tomorrow);
        assert_eq!(cal.relative(datetime!(2026-01-01 09:00), NOW), Relative::Years(2));
        assert_eq!(cal.relative(datetime!(2024-03-20 09:00), NOW), Relative::Months(-3));
        assert_eq!(cal.relative(datetime!(2024-06-27 09:00), NOW), Relative::Weeks(2));
        assert_eq!(cal.relative(datetime!(2024-06-15 09:00), NOW), Relative::ThisWeek);
    }

    #[test]
    fn test_months_from_ignores_year() {
        let cal = Calendar::default();
        let now = datetime!(2025-01-15 12:00);
        assert_eq!(cal.months_from(datetime!(2024-11-15 12:00), now), 10);
        assert_eq!(cal.years_from(datetime!(2024-11-15 12:00), now), -1);
    }

    #[test]
    fn test_weeks_from_ignores_year() {
        let cal = Calendar::default();
        let now = datetime!(2025-01-08 12:00);
        // 2024-11-20 is in week 47 and 2025-01-08 in week 2
        assert_eq!(cal.weeks_from(datetime!(2024-11-20 12:00), now), 45);
    }
}
