//! Windowed paging for infinitely scrolling calendar strips.
//!
//! A calendar strip shows one day, week, or month at a time and lets the
//! user swipe to the neighboring one without end.  Rather than materializing
//! every page, a [`Pager`] keeps a small [`Window`] of pages around the focus
//! date and rebuilds it as the user scrolls toward its edges, telling the
//! host where to scroll so that the swap is invisible.
//!
//! Date arithmetic goes through an injected [`Calendar`], which fixes the
//! first day of the week and the UTC offset.
pub mod calendar;
pub mod decor;
pub mod observe;
pub mod pager;
pub mod pages;
pub use crate::calendar::{
    Calendar, CalendarError, ParseWeekdayError, Relative, Unit, WeekdayArg,
};
pub use crate::decor::{DayCell, Decorator, Highlight, RowKind};
pub use crate::observe::{Binding, ListenerId, Listeners, OffsetObserver};
pub use crate::pager::{
    ConfigError, Pager, PagerConfig, PagerEvent, Phase, SettleToken, Snap,
    DEFAULT_EDGE_THRESHOLD, DEFAULT_SETTLE_DELAY,
};
pub use crate::pages::{Mode, Page, PageFactory, Shape, Window, YEAR_RADIUS};
