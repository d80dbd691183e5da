//! The scroll-window controller.
//!
//! A [`Pager`] keeps a [`Window`] of pages around the focus date and keeps it
//! in step with two signals from the host: changes to the focus date made
//! elsewhere in the application, and the raw horizontal offset of the scroll
//! surface showing the pages.  Whenever it rebuilds the window or needs the
//! view moved, it asks the host to scroll to a page and to call
//! [`Pager::settle`] once [`Pager::settle_delay`] has passed.  Offsets
//! reported in between are the echo of that programmatic scroll and are
//! ignored.
mod config;
pub use self::config::{ConfigError, PagerConfig, DEFAULT_EDGE_THRESHOLD, DEFAULT_SETTLE_DELAY};
use crate::calendar::Calendar;
use crate::decor::{DayCell, Decorator, RowKind};
use crate::observe::{ListenerId, Listeners};
use crate::pages::{Mode, Page, PageFactory, Window};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use time::PrimitiveDateTime;
use tracing::{debug, trace};

/// Proof of a programmatic scroll, handed back to [`Pager::settle`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SettleToken {
    generation: u64,
}

impl SettleToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A request for the host to scroll to a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snap {
    pub index: usize,
    /// Scroll offset of the start of the page
    pub offset: f64,
    pub token: SettleToken,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PagerEvent {
    /// Scrolling moved the focus to another unit
    FocusChanged(PrimitiveDateTime),
    /// A new window replaced the old one
    WindowRebuilt { generation: u64, len: usize },
    /// The host should scroll to the given page
    ScrollTo(Snap),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Phase {
    Idle,
    /// A scroll requested by the pager is in flight
    ProgrammaticScroll { generation: u64 },
}

pub struct Pager {
    factory: PageFactory,
    mode: Mode,
    config: PagerConfig,
    focus: PrimitiveDateTime,
    window: Rc<Window>,
    visible: usize,
    phase: Phase,
    generation: u64,
    loading: bool,
    marks: Vec<PrimitiveDateTime>,
    listeners: Listeners<PagerEvent>,
    select_action: Option<Box<dyn FnMut(PrimitiveDateTime)>>,
}

impl Pager {
    pub fn new(
        calendar: Calendar,
        mode: Mode,
        focus: PrimitiveDateTime,
        config: PagerConfig,
    ) -> Result<Pager, ConfigError> {
        config.validate()?;
        let factory = PageFactory::new(calendar);
        let window = factory.window(mode, focus, config.batch_radius());
        let visible = window.center_index();
        Ok(Pager {
            factory,
            mode,
            config,
            focus,
            window: Rc::new(window),
            visible,
            phase: Phase::Idle,
            generation: 0,
            loading: false,
            marks: Vec::new(),
            listeners: Listeners::new(),
            select_action: None,
        })
    }

    pub fn calendar(&self) -> &Calendar {
        self.factory.calendar()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn focus(&self) -> PrimitiveDateTime {
        self.focus
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    pub fn visible_index(&self) -> usize {
        self.visible
    }

    pub fn visible_page(&self) -> Option<&Page> {
        self.window.get(self.visible)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settle_delay(&self) -> Duration {
        self.config.settle_delay()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// While loading, scrolling and day taps are ignored
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn marks(&self) -> &[PrimitiveDateTime] {
        &self.marks
    }

    /// Sets the dates that have events on them
    pub fn set_marks(&mut self, marks: Vec<PrimitiveDateTime>) {
        self.marks = marks;
    }

    /// Changes the width of a page and scrolls back to the visible page at
    /// the new width
    pub fn set_page_width(&mut self, page_width: f64) -> Result<Vec<PagerEvent>, ConfigError> {
        let config = self.config.with_page_width(page_width);
        config.validate()?;
        self.config = config;
        let mut events = Vec::new();
        self.recenter(self.visible, &mut events);
        Ok(self.emit(events))
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&PagerEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Registers a callback to run after a day is tapped
    pub fn on_select<F>(&mut self, action: F)
    where
        F: FnMut(PrimitiveDateTime) + 'static,
    {
        self.select_action = Some(Box::new(action));
    }

    pub fn has_select_action(&self) -> bool {
        self.select_action.is_some()
    }

    /// Called when the host first shows the pages: scroll to the center page
    pub fn attach(&mut self) -> Vec<PagerEvent> {
        let mut events = Vec::new();
        self.recenter(self.window.center_index(), &mut events);
        self.emit(events)
    }

    /// Handles a change of the focus date made outside of the pager.
    ///
    /// Three-page windows are always rebuilt around the new date.  A batch
    /// window is only rebuilt if it does not cover the new date; otherwise
    /// the view moves to the page of that date if it is not already there.
    /// The new focus is not echoed back as a [`PagerEvent::FocusChanged`].
    pub fn focus_date_changed(&mut self, date: PrimitiveDateTime) -> Vec<PagerEvent> {
        if date == self.focus {
            return Vec::new();
        }
        self.focus = date;
        let mut events = Vec::new();
        if !self.mode.is_batch() || !self.window.covers(self.calendar(), date) {
            self.regenerate(date, &mut events);
        } else if let Some(index) = self.window.position(self.calendar(), date) {
            if index != self.visible {
                self.recenter(index, &mut events);
            }
        }
        self.emit(events)
    }

    /// Handles a new horizontal scroll offset from the host
    pub fn scroll_offset_changed(&mut self, offset: f64) -> Vec<PagerEvent> {
        if let Phase::ProgrammaticScroll { generation } = self.phase {
            trace!(offset, generation, "ignoring scroll during programmatic scroll");
            return Vec::new();
        }
        if self.loading {
            trace!(offset, "ignoring scroll while loading");
            return Vec::new();
        }
        let Some(index) = self.page_index_at(offset) else {
            return Vec::new();
        };
        self.visible = index;
        let Some(date) = self.window.get(index).map(Page::date) else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if !self.calendar().same_unit(date, self.focus, self.mode.unit()) {
            debug!(index, %date, "scrolled to another {}", self.mode.unit());
            self.focus = date;
            events.push(PagerEvent::FocusChanged(date));
            if !self.mode.is_batch() {
                self.regenerate(date, &mut events);
                return self.emit(events);
            }
        }
        if self.mode.is_batch() && self.near_edge(index) {
            debug!(index, len = self.window.len(), "scrolled near edge of batch");
            self.regenerate(date, &mut events);
        }
        self.emit(events)
    }

    /// Ends the programmatic scroll identified by `token`.  Returns `false`
    /// if a newer scroll has started since, in which case nothing changes.
    pub fn settle(&mut self, token: SettleToken) -> bool {
        match self.phase {
            Phase::ProgrammaticScroll { generation } if generation == token.generation => {
                trace!(generation, "settled");
                self.phase = Phase::Idle;
                true
            }
            _ => {
                debug!(
                    stale = token.generation,
                    current = self.generation,
                    "ignoring stale settle token"
                );
                false
            }
        }
    }

    /// Handles a tap on a day
    pub fn select(&mut self, date: PrimitiveDateTime) -> Vec<PagerEvent> {
        if self.loading {
            return Vec::new();
        }
        let events = self.focus_date_changed(date);
        if let Some(action) = self.select_action.as_mut() {
            action(date);
        }
        events
    }

    pub fn jump_to_today(&mut self, now: PrimitiveDateTime) -> Vec<PagerEvent> {
        self.focus_date_changed(now)
    }

    /// Decorates the week of the page at `index`
    pub fn cells(&self, index: usize, now: PrimitiveDateTime) -> Option<[DayCell; 7]> {
        let page = self.window.get(index)?;
        Some(
            self.decorator(now)
                .row(page.date(), page.date(), RowKind::Week),
        )
    }

    /// Decorates the week rows of the month of the page at `index`
    pub fn month_cells(&self, index: usize, now: PrimitiveDateTime) -> Option<Vec<[DayCell; 7]>> {
        let page = self.window.get(index)?;
        let decorator = self.decorator(now);
        Some(
            self.factory
                .month_rows(page.date())
                .iter()
                .map(|row| decorator.row(row.date(), page.date(), RowKind::Month))
                .collect(),
        )
    }

    fn decorator(&self, now: PrimitiveDateTime) -> Decorator<'_> {
        Decorator {
            calendar: self.calendar(),
            selected: self.focus,
            now,
            marks: &self.marks,
            has_select_action: self.has_select_action(),
        }
    }

    fn regenerate(&mut self, center: PrimitiveDateTime, events: &mut Vec<PagerEvent>) {
        self.generation += 1;
        let window = self
            .factory
            .window(self.mode, center, self.config.batch_radius());
        debug!(
            generation = self.generation,
            shape = %window.shape(),
            %center,
            "rebuilt window"
        );
        events.push(PagerEvent::WindowRebuilt {
            generation: self.generation,
            len: window.len(),
        });
        self.window = Rc::new(window);
        self.begin_snap(self.window.center_index(), events);
    }

    fn recenter(&mut self, index: usize, events: &mut Vec<PagerEvent>) {
        self.generation += 1;
        self.begin_snap(self.window.clamp_index(index), events);
    }

    fn begin_snap(&mut self, index: usize, events: &mut Vec<PagerEvent>) {
        self.phase = Phase::ProgrammaticScroll {
            generation: self.generation,
        };
        self.visible = index;
        let snap = Snap {
            index,
            offset: self.page_offset(index),
            token: SettleToken {
                generation: self.generation,
            },
        };
        debug!(index, offset = snap.offset, generation = self.generation, "snapping");
        events.push(PagerEvent::ScrollTo(snap));
    }

    fn emit(&mut self, events: Vec<PagerEvent>) -> Vec<PagerEvent> {
        for ev in &events {
            self.listeners.publish(ev);
        }
        events
    }

    fn page_offset(&self, index: usize) -> f64 {
        f64::from(u32::try_from(index).unwrap_or(u32::MAX)) * self.config.page_width()
    }

    /// Returns the index of the page nearest to `offset`, clamped to the
    /// window, or `None` if the window is empty or the offset is not a number
    fn page_index_at(&self, offset: f64) -> Option<usize> {
        if self.window.is_empty() || offset.is_nan() {
            return None;
        }
        let last = self.window.len() - 1;
        let raw = (offset / self.config.page_width()).round();
        if raw <= 0.0 {
            Some(0)
        } else if raw >= f64::from(u32::try_from(last).unwrap_or(u32::MAX)) {
            Some(last)
        } else {
            // `raw` is a whole number strictly between 0 and `last`
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = raw as usize;
            Some(index)
        }
    }

    fn near_edge(&self, index: usize) -> bool {
        let threshold = self.config.edge_threshold();
        index <= threshold || index.saturating_add(threshold).saturating_add(1) >= self.window.len()
    }
}

impl fmt::Debug for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("factory", &self.factory)
            .field("mode", &self.mode)
            .field("config", &self.config)
            .field("focus", &self.focus)
            .field("window", &self.window.shape())
            .field("visible", &self.visible)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("loading", &self.loading)
            .field("marks", &self.marks)
            .field("listeners", &self.listeners)
            .field("select_action", &self.select_action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Unit;
    use std::cell::RefCell;
    use time::macros::datetime;

    const WIDTH: f64 = 100.0;

    fn pager(mode: Mode, focus: PrimitiveDateTime) -> Pager {
        Pager::new(Calendar::default(), mode, focus, PagerConfig::new(WIDTH))
            .expect("config should be valid")
    }

    fn snap_of(events: &[PagerEvent]) -> Snap {
        events
            .iter()
            .find_map(|ev| match ev {
                PagerEvent::ScrollTo(snap) => Some(*snap),
                _ => None,
            })
            .expect("events should include a snap")
    }

    #[test]
    fn test_new_centers_without_scrolling() {
        let p = pager(Mode::Weekly, datetime!(2024-06-12 00:00));
        assert_eq!(p.window().len(), 3);
        assert_eq!(p.visible_index(), 1);
        assert_eq!(p.phase(), Phase::Idle);
        assert_eq!(p.generation(), 0);
    }

    #[test]
    fn test_attach_snaps_to_center() {
        let mut p = pager(Mode::WeeklyBatch, datetime!(2024-06-12 00:00));
        let events = p.attach();
        let snap = snap_of(&events);
        assert_eq!(events.len(), 1);
        assert_eq!(snap.index, 52);
        assert_eq!(snap.offset, 5200.0);
        assert_eq!(p.phase(), Phase::ProgrammaticScroll { generation: 1 });
        assert!(p.settle(snap.token));
        assert_eq!(p.phase(), Phase::Idle);
    }

    #[test]
    fn test_scroll_ignored_during_programmatic_scroll() {
        let mut p = pager(Mode::Monthly, datetime!(2024-06-12 00:00));
        p.attach();
        assert!(p.scroll_offset_changed(0.0).is_empty());
        assert_eq!(p.focus(), datetime!(2024-06-12 00:00));
        assert_eq!(p.visible_index(), 1);
    }

    #[test]
    fn test_monthly_scroll_back_moves_focus_and_rebuilds() {
        let mut p = pager(Mode::Monthly, datetime!(2024-03-31 00:00));
        let token = snap_of(&p.attach()).token;
        p.settle(token);
        let events = p.scroll_offset_changed(0.0);
        assert_eq!(
            events[0],
            PagerEvent::FocusChanged(datetime!(2024-02-29 00:00))
        );
        assert_eq!(
            events[1],
            PagerEvent::WindowRebuilt {
                generation: 2,
                len: 3
            }
        );
        assert_eq!(snap_of(&events).index, 1);
        assert_eq!(p.focus(), datetime!(2024-02-29 00:00));
        assert_eq!(
            p.window().center().map(Page::date),
            Some(datetime!(2024-02-29 00:00))
        );
        assert!(matches!(p.phase(), Phase::ProgrammaticScroll { .. }));
    }

    #[test]
    fn test_scroll_within_same_unit_is_quiet() {
        let mut p = pager(Mode::Daily, datetime!(2024-06-12 08:00));
        let token = snap_of(&p.attach()).token;
        p.settle(token);
        assert!(p.scroll_offset_changed(110.0).is_empty());
        assert!(p.scroll_offset_changed(149.0).is_empty());
        assert_eq!(p.phase(), Phase::Idle);
    }

    #[test]
    fn test_scroll_offset_is_clamped() {
        let mut p = pager(Mode::WeeklyBatch, datetime!(2024-06-12 00:00));
        let token = snap_of(&p.attach()).token;
        p.settle(token);
        let events = p.scroll_offset_changed(1.0e9);
        assert_eq!(
            events[0],
            PagerEvent::FocusChanged(datetime!(2025-06-11 00:00))
        );
        assert!(p
            .window()
            .center()
            .is_some_and(|pg| pg.date() == datetime!(2025-06-11 00:00)));
    }

    #[test]
    fn test_stale_settle_token_is_ignored() {
        let mut p = pager(Mode::Weekly, datetime!(2024-06-12 00:00));
        let first = snap_of(&p.attach()).token;
        let second = snap_of(&p.focus_date_changed(datetime!(2024-08-01 00:00))).token;
        assert!(first != second);
        assert!(!p.settle(first));
        assert!(matches!(p.phase(), Phase::ProgrammaticScroll { .. }));
        assert!(p.scroll_offset_changed(0.0).is_empty());
        assert!(p.settle(second));
        assert_eq!(p.phase(), Phase::Idle);
    }

    #[test]
    fn test_triple_focus_change_always_rebuilds() {
        let mut p = pager(Mode::Weekly, datetime!(2024-06-12 00:00));
        let before = Rc::clone(p.window());
        let events = p.focus_date_changed(datetime!(2024-06-13 00:00));
        assert!(matches!(events[0], PagerEvent::WindowRebuilt { .. }));
        assert!(!Rc::ptr_eq(&before, p.window()));
        assert!(p.focus_date_changed(datetime!(2024-06-13 00:00)).is_empty());
    }

    #[test]
    fn test_batch_focus_change_to_other_page_recenters() {
        let mut p = pager(Mode::WeeklyBatch, datetime!(2024-06-12 00:00));
        let before = Rc::clone(p.window());
        let events = p.focus_date_changed(datetime!(2024-07-04 00:00));
        assert_eq!(events.len(), 1);
        assert_eq!(snap_of(&events).index, 55);
        assert!(Rc::ptr_eq(&before, p.window()));
        assert_eq!(p.visible_index(), 55);
    }

    #[test]
    fn test_loading_blocks_scroll_and_taps() {
        let selected = Rc::new(RefCell::new(Vec::new()));
        let mut p = pager(Mode::Weekly, datetime!(2024-06-12 00:00));
        let s = Rc::clone(&selected);
        p.on_select(move |d| s.borrow_mut().push(d));
        p.set_loading(true);
        assert!(p.scroll_offset_changed(0.0).is_empty());
        assert!(p.select(datetime!(2024-06-14 00:00)).is_empty());
        assert!(selected.borrow().is_empty());
        p.set_loading(false);
        p.select(datetime!(2024-06-14 00:00));
        assert_eq!(*selected.borrow(), [datetime!(2024-06-14 00:00)]);
        assert_eq!(p.focus(), datetime!(2024-06-14 00:00));
    }

    #[test]
    fn test_subscribers_see_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut p = pager(Mode::Daily, datetime!(2024-06-12 00:00));
        let s = Rc::clone(&seen);
        p.subscribe(move |ev| s.borrow_mut().push(ev.clone()));
        let events = p.attach();
        assert_eq!(*seen.borrow(), events);
    }

    #[test]
    fn test_set_page_width() {
        let mut p = pager(Mode::Weekly, datetime!(2024-06-12 00:00));
        assert!(p.set_page_width(0.0).is_err());
        let events = p.set_page_width(250.0).expect("width should be valid");
        let snap = snap_of(&events);
        assert_eq!(snap.index, 1);
        assert_eq!(snap.offset, 250.0);
    }

    #[test]
    fn test_cells() {
        let mut p = pager(Mode::Weekly, datetime!(2024-06-12 00:00));
        p.set_marks(vec![datetime!(2024-06-20 18:00)]);
        let now = datetime!(2024-06-12 09:00);
        let next_week = p.cells(2, now).expect("page 2 should exist");
        assert_eq!(next_week[0].date, datetime!(2024-06-16 00:00));
        assert!(next_week[4].has_event);
        let this_week = p.cells(1, now).expect("page 1 should exist");
        assert!(this_week[3].is_selected && this_week[3].is_today);
        assert!(p.cells(3, now).is_none());
    }

    #[test]
    fn test_month_cells() {
        let p = pager(Mode::Monthly, datetime!(2024-02-15 00:00));
        let rows = p
            .month_cells(1, datetime!(2024-02-15 00:00))
            .expect("page 1 should exist");
        assert_eq!(rows.len(), 5);
        assert!(!rows[0][0].visible);
        assert_eq!(rows[0][4].day, 1);
        assert!(rows[4][4].visible);
        assert!(!rows[4][5].visible);
        assert_eq!(p.window().unit(), Unit::Month);
    }
}
