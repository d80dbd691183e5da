//! Per-day decoration state for rendering a week row
use crate::calendar::{Calendar, Unit};
use time::PrimitiveDateTime;

/// Which kind of strip a week row belongs to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RowKind {
    /// A week strip, in which every day is shown
    Week,
    /// A row of a month grid, in which days outside the month are hidden
    Month,
}

/// Background emphasis of a day
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Highlight {
    #[default]
    None,
    /// Faint emphasis, used for today
    Tint,
    /// Full emphasis, used for the selected day
    Solid,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DayCell {
    pub date: PrimitiveDateTime,
    pub day: u8,
    pub is_today: bool,
    pub is_selected: bool,
    pub has_event: bool,
    /// Whether the day belongs to the row's anchor month
    pub in_month: bool,
    pub visible: bool,
    pub highlight: Highlight,
}

/// Everything needed to decorate the days of a row
#[derive(Clone, Copy, Debug)]
pub struct Decorator<'a> {
    pub calendar: &'a Calendar,
    pub selected: PrimitiveDateTime,
    pub now: PrimitiveDateTime,
    pub marks: &'a [PrimitiveDateTime],
    /// When the host handles taps itself, the selected day is not filled in
    pub has_select_action: bool,
}

impl Decorator<'_> {
    pub fn cell(
        &self,
        date: PrimitiveDateTime,
        anchor: PrimitiveDateTime,
        kind: RowKind,
    ) -> DayCell {
        let cal = self.calendar;
        let is_today = cal.is_today(date, self.now);
        let is_selected = cal.same_day(date, self.selected);
        let in_month = cal.same_unit(date, anchor, Unit::Month);
        let highlight = match (is_selected, is_today) {
            (true, true) if self.has_select_action => Highlight::Tint,
            (true, false) if self.has_select_action => Highlight::None,
            (true, _) => Highlight::Solid,
            (false, true) => Highlight::Tint,
            (false, false) => Highlight::None,
        };
        DayCell {
            date,
            day: date.day(),
            is_today,
            is_selected,
            has_event: cal.contains_same_day(self.marks, date),
            in_month,
            visible: kind == RowKind::Week || in_month,
            highlight,
        }
    }

    /// Decorates the seven days of the week containing `date`.  `anchor`
    /// picks the month that counts as "in month".
    pub fn row(
        &self,
        date: PrimitiveDateTime,
        anchor: PrimitiveDateTime,
        kind: RowKind,
    ) -> [DayCell; 7] {
        self.calendar
            .week_of(date)
            .map(|d| self.cell(d, anchor, kind))
    }
}
