use crate::theme::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::{Date, Month};

const OUTER_WIDTH: u16 = 17;
const OUTER_HEIGHT: u16 = 8;

/// Number of digits in a `YYYYMMDD` date
const DIGITS: usize = 8;

/// Placeholder shown for each unfilled digit, with the separators that
/// precede the month and day
const TEMPLATE: [(Option<&str>, &str); DIGITS] = [
    (None, "Y"),
    (None, "Y"),
    (None, "Y"),
    (None, "Y"),
    (Some("-"), "M"),
    (None, "M"),
    (Some("-"), "D"),
    (None, "D"),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * .................
     * .┌─ Jump To… ──┐.
     * .│             │.
     * .│ -YYYY-MM-DD │.
     * .│             │.
     * .│   [ENTER]   │.
     * .└─────────────┘.
     * .................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Jump To… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

/// The partially typed date of the jump-to dialog
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    negative: bool,
    digits: [Option<u8>; DIGITS],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Only the label, not its centering padding, gets underlined
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == DIGITS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = vec![Span::styled(
            if self.negative { "-" } else { " " },
            BASE_STYLE,
        )];
        for (dg, (sep, fallback)) in self.digits.into_iter().zip(TEMPLATE) {
            if let Some(sep) = sep {
                spans.push(Span::styled(sep, BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                None => Span::styled(fallback, UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Negative, 0) => {
                self.negative = !self.negative;
                JumpToOutput::Ok
            }
            (JumpToInput::Positive, 0) => {
                self.negative = false;
                JumpToOutput::Ok
            }
            (JumpToInput::Digit(d), 0..DIGITS) => {
                self.digits[self.pos] = Some(d);
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, DIGITS) => match self.to_date() {
                Some(date) => JumpToOutput::Jump(date),
                None => JumpToOutput::Invalid,
            },
            _ => JumpToOutput::Invalid,
        }
    }

    fn to_date(self) -> Option<Date> {
        let year = i32::try_from(number(&self.digits[0..4])?).ok()?;
        let year = if self.negative { -year } else { year };
        let month = Month::try_from(u8::try_from(number(&self.digits[4..6])?).ok()?).ok()?;
        let day = u8::try_from(number(&self.digits[6..8])?).ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }
}

/// Reads a run of decimal digits, or returns `None` if any is unfilled
fn number(digits: &[Option<u8>]) -> Option<u32> {
    digits
        .iter()
        .try_fold(0u32, |acc, d| Some(acc * 10 + u32::from((*d)?)))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Negative,
    Positive,
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(Date),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_digits(state: &mut JumpToState, s: &str) {
        for ch in s.chars() {
            let d = ch.to_digit(10).and_then(|d| u8::try_from(d).ok());
            assert_eq!(
                state.handle_input(JumpToInput::Digit(d.unwrap_or_default())),
                JumpToOutput::Ok
            );
        }
    }

    #[test]
    fn test_jump() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20240229");
        assert_eq!(
            state.handle_input(JumpToInput::Digit(1)),
            JumpToOutput::Invalid
        );
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(date!(2024-02-29))
        );
    }

    #[test]
    fn test_invalid_date() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20230229");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
    }

    #[test]
    fn test_enter_before_complete() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "2024");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
    }

    #[test]
    fn test_backspace_and_negative() {
        let mut state = JumpToState::new();
        assert_eq!(
            state.handle_input(JumpToInput::Backspace),
            JumpToOutput::Invalid
        );
        state.handle_input(JumpToInput::Negative);
        type_digits(&mut state, "00441");
        state.handle_input(JumpToInput::Backspace);
        type_digits(&mut state, "3152");
        state.handle_input(JumpToInput::Backspace);
        type_digits(&mut state, "5");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(date!(-0044-03-15))
        );
    }
}
