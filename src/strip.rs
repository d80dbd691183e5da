use crate::theme::{
    day::{MARKED_STYLE, OUTSIDE_STYLE, SELECTED_STYLE, TODAY_STYLE},
    BASE_STYLE, TITLE_STYLE, WEEKDAY_STYLE,
};
use calpager::{DayCell, Highlight, Mode, Pager, Relative, Unit};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};

/// Number of columns per day
const DAY_COLUMNS: u16 = 6;

/// Number of columns per page
pub(crate) const PAGE_COLUMNS: u16 = DAY_COLUMNS * 7;

const RULE: char = '─';

static DAY_FMT: &[FormatItem<'_>] =
    format_description!("[weekday repr:short], [month repr:short] [day padding:none] [year]");

static WEEK_FMT: &[FormatItem<'_>] =
    format_description!("Week of [month repr:short] [day padding:none], [year]");

static MONTH_FMT: &[FormatItem<'_>] = format_description!("[month repr:long] [year]");

/// Column at which the page at `index` starts
pub(crate) fn page_start(index: usize) -> u32 {
    u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(u32::from(PAGE_COLUMNS))
}

/// The pages of a [`Pager`]'s window laid side by side and viewed from
/// `offset` columns into the row
#[derive(Clone, Copy, Debug)]
pub(crate) struct Strip<'a> {
    pager: &'a Pager,
    offset: u32,
    today: PrimitiveDateTime,
}

impl<'a> Strip<'a> {
    pub(crate) fn new(pager: &'a Pager, offset: u32, today: PrimitiveDateTime) -> Strip<'a> {
        Strip {
            pager,
            offset,
            today,
        }
    }

    fn page_lines(&self, index: usize) -> Vec<Line<'static>> {
        let Some(page) = self.pager.window().get(index) else {
            return Vec::new();
        };
        let rows = match self.pager.mode() {
            Mode::Monthly => self
                .pager
                .month_cells(index, self.today)
                .unwrap_or_default(),
            _ => self.pager.cells(index, self.today).into_iter().collect(),
        };
        let mut lines = vec![
            Line::styled(self.title(page.date()), TITLE_STYLE).centered(),
            Line::from_iter(rows.first().into_iter().flatten().map(weekday_span)),
            Line::styled(
                String::from(RULE).repeat(usize::from(PAGE_COLUMNS)),
                BASE_STYLE,
            ),
        ];
        lines.extend(rows.iter().map(|row| Line::from_iter(row.iter().map(day_span))));
        lines
    }

    fn title(&self, date: PrimitiveDateTime) -> String {
        let calendar = self.pager.calendar();
        let (fmt, date) = match self.pager.mode().unit() {
            Unit::Day => (DAY_FMT, date),
            Unit::Month => (MONTH_FMT, date),
            Unit::Week | Unit::Year => (WEEK_FMT, calendar.start_of(date, Unit::Week)),
        };
        let title = date.format(fmt).unwrap_or_default();
        match self.pager.mode() {
            Mode::Daily => format!(
                "{title} ({})",
                relative_label(calendar.relative(date, self.today))
            ),
            _ => title,
        }
    }
}

impl Widget for Strip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let window = self.pager.window();
        if window.is_empty() || area.width == 0 {
            return;
        }
        let page_cols = u32::from(PAGE_COLUMNS);
        let first = self.offset / page_cols;
        let last = self.offset.saturating_add(u32::from(area.width) - 1) / page_cols;
        let first = usize::try_from(first).unwrap_or(usize::MAX);
        let last = usize::try_from(last)
            .unwrap_or(usize::MAX)
            .min(window.len() - 1);
        for index in first..=last {
            let start = page_start(index);
            let (x, skip) = if start < self.offset {
                (0, self.offset - start)
            } else {
                (start - self.offset, 0)
            };
            let (Ok(x), Ok(skip)) = (u16::try_from(x), u16::try_from(skip)) else {
                continue;
            };
            let width = PAGE_COLUMNS
                .saturating_sub(skip)
                .min(area.width.saturating_sub(x));
            let page_area = Rect {
                x: area.x + x,
                y: area.y,
                width,
                height: area.height,
            };
            Paragraph::new(self.page_lines(index))
                .scroll((0, skip))
                .render(page_area, buf);
        }
    }
}

fn weekday_span(cell: &DayCell) -> Span<'static> {
    let name = cell.date.weekday().to_string();
    let abbrev = name.get(..2).unwrap_or(&name);
    let width = usize::from(DAY_COLUMNS);
    Span::styled(format!("{abbrev:^width$}"), WEEKDAY_STYLE)
}

fn day_span(cell: &DayCell) -> Span<'static> {
    let width = usize::from(DAY_COLUMNS);
    if !cell.visible {
        return Span::styled(" ".repeat(width), BASE_STYLE);
    }
    let label = if cell.is_selected {
        format!("[{}]", cell.day)
    } else {
        cell.day.to_string()
    };
    let style = match cell.highlight {
        Highlight::Solid => SELECTED_STYLE,
        Highlight::Tint => TODAY_STYLE,
        Highlight::None if cell.has_event => MARKED_STYLE,
        Highlight::None if !cell.in_month => OUTSIDE_STYLE,
        Highlight::None => BASE_STYLE,
    };
    Span::styled(format!("{label:^width$}"), style)
}

fn relative_label(rel: Relative) -> String {
    match rel {
        Relative::Yesterday => String::from("yesterday"),
        Relative::Today => String::from("today"),
        Relative::Tomorrow => String::from("tomorrow"),
        Relative::Years(n) => format!("{n:+}y"),
        Relative::Months(n) => format!("{n:+}mo"),
        Relative::Weeks(n) => format!("{n:+}w"),
        Relative::ThisWeek => String::from("this week"),
    }
}
