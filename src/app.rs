use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::strip::{page_start, Strip, PAGE_COLUMNS};
use crate::theme::{BASE_STYLE, STATUS_STYLE};
use calpager::{Pager, PagerEvent, Phase, SettleToken};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::Instant;
use time::PrimitiveDateTime;
use tracing::debug;

/// Number of columns moved by a drag
const DRAG_COLUMNS: u32 = PAGE_COLUMNS as u32 / 4;

#[derive(Debug)]
pub(crate) struct App {
    pager: Pager,
    today: PrimitiveDateTime,
    /// Horizontal scroll position of the strip, in columns
    offset: u32,
    /// Programmatic scroll waiting to be settled, and when to settle it
    pending: Option<(SettleToken, Instant)>,
    state: AppState,
}

impl App {
    pub(crate) fn new(pager: Pager, today: PrimitiveDateTime) -> App {
        let mut app = App {
            pager,
            today,
            offset: 0,
            pending: None,
            state: AppState::Strip,
        };
        let events = app.pager.attach();
        app.handle_events(events);
        app
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Some((_, deadline)) = self.pending {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !poll(timeout)? {
                self.settle_pending();
                return Ok(());
            }
        }
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = read()?
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Strip => match key {
                KeyCode::Char('h') | KeyCode::Left => self.page_left(),
                KeyCode::Char('l') | KeyCode::Right => self.page_right(),
                KeyCode::Char('H') => self.scroll_to(self.offset.saturating_sub(DRAG_COLUMNS)),
                KeyCode::Char('L') => self.scroll_to(self.offset.saturating_add(DRAG_COLUMNS)),
                KeyCode::Char('0') | KeyCode::Home => {
                    let events = self.pager.jump_to_today(self.today);
                    self.handle_events(events);
                    true
                }
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Strip;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Strip;
                    return true;
                }
                let output = match key {
                    KeyCode::Char('-') => state.handle_input(JumpToInput::Negative),
                    KeyCode::Char('+') => state.handle_input(JumpToInput::Positive),
                    KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                        Some(d) => state.handle_input(JumpToInput::Digit(d)),
                        None => JumpToOutput::Invalid,
                    },
                    KeyCode::Backspace | KeyCode::Delete => {
                        state.handle_input(JumpToInput::Backspace)
                    }
                    KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                    _ => JumpToOutput::Invalid,
                };
                match output {
                    JumpToOutput::Ok => true,
                    JumpToOutput::Invalid => false,
                    JumpToOutput::Jump(date) => {
                        self.state = AppState::Strip;
                        let events = self.pager.focus_date_changed(date.midnight());
                        self.handle_events(events);
                        true
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    /// Index of the page nearest to the current offset
    fn nearest_page(&self) -> u32 {
        let page_cols = u32::from(PAGE_COLUMNS);
        self.offset.saturating_add(page_cols / 2) / page_cols
    }

    fn page_left(&mut self) -> bool {
        match self.nearest_page().checked_sub(1) {
            Some(page) => self.scroll_to(page * u32::from(PAGE_COLUMNS)),
            None => false,
        }
    }

    fn page_right(&mut self) -> bool {
        let page = self.nearest_page().saturating_add(1);
        self.scroll_to(page.saturating_mul(u32::from(PAGE_COLUMNS)))
    }

    /// Moves the strip the way a user's swipe would and reports the new
    /// offset to the pager.  Returns `false` if the strip cannot move that
    /// way.
    fn scroll_to(&mut self, offset: u32) -> bool {
        let max = page_start(self.pager.window().len().saturating_sub(1));
        let offset = offset.min(max);
        if offset == self.offset {
            return false;
        }
        self.offset = offset;
        let events = self.pager.scroll_offset_changed(f64::from(offset));
        self.handle_events(events);
        true
    }

    /// Ends the pending programmatic scroll, then reports where the strip
    /// actually is, in case it was moved while the pager was not listening
    fn settle_pending(&mut self) {
        let Some((token, _)) = self.pending.take() else {
            return;
        };
        if self.pager.settle(token) {
            let events = self.pager.scroll_offset_changed(f64::from(self.offset));
            self.handle_events(events);
        }
    }

    fn handle_events(&mut self, events: Vec<PagerEvent>) {
        for ev in events {
            match ev {
                PagerEvent::ScrollTo(snap) => {
                    self.offset = page_start(snap.index);
                    let deadline = Instant::now() + self.pager.settle_delay();
                    self.pending = Some((snap.token, deadline));
                }
                PagerEvent::FocusChanged(date) => debug!(%date, "focus moved by scrolling"),
                PagerEvent::WindowRebuilt { .. } => (),
            }
        }
    }

    fn status(&self) -> String {
        let mut status = format!(
            " {} | page {}/{} | focus {}",
            self.pager.mode(),
            self.pager.visible_index() + 1,
            self.pager.window().len(),
            self.pager.focus().date(),
        );
        if matches!(self.pager.phase(), Phase::ProgrammaticScroll { .. }) {
            status.push_str(" | settling");
        }
        status
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [strip_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        Strip::new(&self.pager, self.offset, self.today).render(strip_area, buf);
        Line::styled(self.status(), STATUS_STYLE).render(status_area, buf);
        if self.state == AppState::Helping {
            Help.render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Strip,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use calpager::{Calendar, Mode, PagerConfig};
    use ratatui::buffer::Cell;
    use time::macros::datetime;

    const TODAY: PrimitiveDateTime = datetime!(2024-06-12 09:00);

    fn app(mode: Mode) -> App {
        let config = PagerConfig::new(f64::from(PAGE_COLUMNS));
        let pager = Pager::new(Calendar::default(), mode, TODAY, config).unwrap();
        App::new(pager, TODAY)
    }

    fn render(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .filter_map(|x| buf.cell((x, y)))
                    .map(Cell::symbol)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_starts_on_center_page() {
        let mut app = app(Mode::Weekly);
        assert_eq!(app.offset, 42);
        assert!(app.pending.is_some());
        let lines = render(&mut app, 60, 5);
        assert!(lines[0].contains("Week of Jun 9, 2024"));
        assert!(lines[3].contains("[12]"));
        assert!(lines[4].starts_with(" weekly | page 2/3 | focus 2024-06-12 | settling"));
        app.settle_pending();
        assert!(app.pending.is_none());
        let lines = render(&mut app, 60, 5);
        assert!(!lines[4].contains("settling"));
    }

    #[test]
    fn test_scroll_during_settle_is_caught_up() {
        let mut app = app(Mode::Weekly);
        assert!(app.handle_key(KeyCode::Char('l')));
        assert_eq!(app.offset, 84);
        assert_eq!(app.pager.focus(), TODAY);
        app.settle_pending();
        assert_eq!(app.pager.focus(), datetime!(2024-06-19 09:00));
        assert_eq!(app.offset, 42);
        let lines = render(&mut app, 42, 5);
        assert!(lines[0].contains("Week of Jun 16, 2024"));
    }

    #[test]
    fn test_page_left_rebuilds_window() {
        let mut app = app(Mode::Monthly);
        app.settle_pending();
        assert!(app.handle_key(KeyCode::Left));
        assert_eq!(app.pager.focus(), datetime!(2024-05-12 09:00));
        assert_eq!(app.offset, 42);
        app.settle_pending();
        let lines = render(&mut app, 42, 10);
        assert!(lines[0].contains("May 2024"));
    }

    #[test]
    fn test_drag_stays_on_page() {
        let mut app = app(Mode::Daily);
        app.settle_pending();
        for offset in [52, 62] {
            assert!(app.handle_key(KeyCode::Char('L')));
            assert_eq!(app.offset, offset);
            assert_eq!(app.pager.focus(), TODAY);
            assert!(app.pending.is_none());
        }
        assert!(app.handle_key(KeyCode::Char('L')));
        assert_eq!(app.offset, 42);
        assert_eq!(app.pager.focus(), datetime!(2024-06-13 09:00));
    }

    #[test]
    fn test_jump_to() {
        let mut app = app(Mode::WeeklyBatch);
        app.settle_pending();
        assert!(app.handle_key(KeyCode::Char('g')));
        for c in "20250101".chars() {
            assert!(app.handle_key(KeyCode::Char(c)));
        }
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Strip);
        assert_eq!(app.pager.focus(), datetime!(2025-01-01 00:00));
        assert_eq!(app.pager.visible_index(), 81);
        assert_eq!(app.offset, 81 * 42);
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.pager.focus(), TODAY);
        assert_eq!(app.offset, 52 * 42);
    }

    #[test]
    fn test_help() {
        let mut app = app(Mode::Weekly);
        app.handle_key(KeyCode::Char('?'));
        let lines = render(&mut app, 80, 24);
        assert!(lines.iter().any(|l| l.contains(" Commands ")));
        assert!(lines.iter().any(|l| l.contains("Drag a quarter page left")));
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Strip);
    }

    #[test]
    fn test_quit() {
        let mut app = app(Mode::Weekly);
        assert!(!app.handle_key(KeyCode::Char('x')));
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.quitting());
    }
}
