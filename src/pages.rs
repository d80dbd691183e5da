//! Windows of pages around a focus date
use crate::calendar::{Calendar, Unit};
use std::fmt;
use std::slice;
use time::PrimitiveDateTime;

/// Number of weeks on either side of the focus in a year-batch window
pub const YEAR_RADIUS: usize = 52;

/// One scrollable unit (a day, week, or month) of a [`Window`]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Page {
    id: String,
    date: PrimitiveDateTime,
    index: usize,
}

impl Page {
    fn new(calendar: &Calendar, date: PrimitiveDateTime, index: usize) -> Page {
        let id = format!("{}_{index}", calendar.timestamp(date));
        Page { id, date, index }
    }

    /// Stable key for the page, derived from its date and index only
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> PrimitiveDateTime {
        self.date
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// How a [`Window`] is laid out around its focus date
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Shape {
    /// Previous, current, and next unit
    Triple(Unit),
    /// `radius` weeks on either side of the current week
    Batch { radius: usize },
}

impl Shape {
    pub fn unit(&self) -> Unit {
        match self {
            Shape::Triple(unit) => *unit,
            Shape::Batch { .. } => Unit::Week,
        }
    }

    /// Index of the page built from the focus date
    pub fn center_index(&self) -> usize {
        match self {
            Shape::Triple(_) => 1,
            Shape::Batch { radius } => *radius,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Triple(unit) => write!(f, "triple {unit} window"),
            Shape::Batch { radius } => write!(f, "{radius}-week batch window"),
        }
    }
}

/// An immutable, chronologically ordered run of pages.  Changing the focus
/// means building a new window.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Window {
    pages: Vec<Page>,
    shape: Shape,
}

impl Window {
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn unit(&self) -> Unit {
        self.shape.unit()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn iter(&self) -> slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn first(&self) -> Option<&Page> {
        self.pages.first()
    }

    pub fn last(&self) -> Option<&Page> {
        self.pages.last()
    }

    /// The structural center of the window, clamped to the last page if the
    /// window is shorter than its shape calls for
    pub fn center_index(&self) -> usize {
        self.shape
            .center_index()
            .min(self.pages.len().saturating_sub(1))
    }

    pub fn center(&self) -> Option<&Page> {
        self.pages.get(self.center_index())
    }

    /// Clamps a page index to the valid range of the window
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.pages.len().saturating_sub(1))
    }

    /// Whether `date` lies between the start of the first page's unit and the
    /// end of the last page's unit
    pub fn covers(&self, calendar: &Calendar, date: PrimitiveDateTime) -> bool {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return false;
        };
        let unit = self.unit();
        calendar.start_of(first.date, unit) <= date && date <= calendar.end_of(last.date, unit)
    }

    /// Returns the index of the page whose unit contains `date`
    pub fn position(&self, calendar: &Calendar, date: PrimitiveDateTime) -> Option<usize> {
        let unit = self.unit();
        self.pages
            .iter()
            .position(|p| calendar.same_unit(p.date, date, unit))
    }
}

impl<'a> IntoIterator for &'a Window {
    type Item = &'a Page;
    type IntoIter = slice::Iter<'a, Page>;

    fn into_iter(self) -> slice::Iter<'a, Page> {
        self.iter()
    }
}

/// The paging strategy of a calendar strip
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Three-page window of days
    Daily,
    /// Three-page window of weeks
    Weekly,
    /// Three-page window of months
    Monthly,
    /// Year-radius batch of weeks for continuous scrolling
    WeeklyBatch,
}

impl Mode {
    pub fn unit(&self) -> Unit {
        match self {
            Mode::Daily => Unit::Day,
            Mode::Weekly | Mode::WeeklyBatch => Unit::Week,
            Mode::Monthly => Unit::Month,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Mode::WeeklyBatch)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Daily => write!(f, "daily"),
            Mode::Weekly => write!(f, "weekly"),
            Mode::Monthly => write!(f, "monthly"),
            Mode::WeeklyBatch => write!(f, "weekly batch"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PageFactory {
    calendar: Calendar,
}

impl PageFactory {
    pub fn new(calendar: Calendar) -> PageFactory {
        PageFactory { calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Builds the window for `mode` around `focus`; `radius` only applies to
    /// [`Mode::WeeklyBatch`]
    pub fn window(&self, mode: Mode, focus: PrimitiveDateTime, radius: usize) -> Window {
        match mode {
            Mode::WeeklyBatch => self.year_batch(focus, radius),
            _ => self.triple(focus, mode.unit()),
        }
    }

    /// The unit before `focus`, `focus` itself, and the unit after
    pub fn triple(&self, focus: PrimitiveDateTime, unit: Unit) -> Window {
        let pages = (-1i64..=1)
            .zip(0..)
            .map(|(offset, index)| self.make(self.calendar.shift(focus, offset, unit), index))
            .collect();
        Window {
            pages,
            shape: Shape::Triple(unit),
        }
    }

    /// `radius` weeks on either side of `focus`, with `focus` at index
    /// `radius`
    pub fn year_batch(&self, focus: PrimitiveDateTime, radius: usize) -> Window {
        let r = i64::try_from(radius).unwrap_or(i64::MAX);
        let pages = (-r..=r)
            .zip(0..)
            .map(|(offset, index)| {
                self.make(self.calendar.shift(focus, offset, Unit::Week), index)
            })
            .collect();
        Window {
            pages,
            shape: Shape::Batch { radius },
        }
    }

    /// One page per week row of the month containing `focus`
    pub fn month_rows(&self, focus: PrimitiveDateTime) -> Vec<Page> {
        self.calendar
            .one_day_per_week_of_month(focus)
            .into_iter()
            .zip(0..)
            .map(|(date, index)| self.make(date, index))
            .collect()
    }

    fn make(&self, date: PrimitiveDateTime, index: usize) -> Page {
        Page::new(&self.calendar, date, index)
    }
}
