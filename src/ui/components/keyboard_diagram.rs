use std::collections::HashSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;
use keystep::keyboard::finger::{Finger, FingerAssignment, Hand};
use keystep::keyboard::model::{KeyHint, KeyboardModel, PhysicalKey};

pub struct KeyboardDiagram<'a> {
    model: &'a KeyboardModel,
    hint: Option<KeyHint>,
    level_keys: &'a [char],
    depressed_keys: &'a HashSet<char>,
    compact: bool,
    theme: &'a Theme,
}

impl<'a> KeyboardDiagram<'a> {
    pub fn new(
        model: &'a KeyboardModel,
        hint: Option<KeyHint>,
        level_keys: &'a [char],
        depressed_keys: &'a HashSet<char>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            model,
            hint,
            level_keys,
            depressed_keys,
            compact: false,
            theme,
        }
    }

    /// Drop the number row.
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn height(compact: bool) -> u16 {
        // rows + shift/space row + borders
        if compact { 6 } else { 7 }
    }
}

fn finger_color(assignment: FingerAssignment) -> Color {
    match (assignment.hand, assignment.finger) {
        (_, Finger::Pinky) => Color::Rgb(180, 100, 100),
        (_, Finger::Ring) => Color::Rgb(180, 140, 80),
        (_, Finger::Middle) => Color::Rgb(120, 160, 80),
        (Hand::Left, Finger::Index) => Color::Rgb(80, 140, 180),
        (Hand::Right, Finger::Index) => Color::Rgb(100, 140, 200),
        (_, Finger::Thumb) => Color::Rgb(120, 120, 120),
    }
}

impl KeyboardDiagram<'_> {
    fn in_level(&self, key: &PhysicalKey) -> bool {
        self.level_keys
            .iter()
            .any(|&c| c == key.base || c == key.shifted)
    }

    fn key_style(&self, key: &PhysicalKey) -> Style {
        let colors = &self.theme.colors;
        let is_hint = self.hint.is_some_and(|h| h.key == key.base);
        let is_down = self.depressed_keys.contains(&key.base);

        let style = if is_hint {
            Style::default()
                .fg(colors.bg())
                .bg(colors.hint_key())
                .add_modifier(Modifier::BOLD)
        } else if self.in_level(key) {
            let assignment = self
                .model
                .finger_for_char(key.base)
                .unwrap_or(FingerAssignment::new(Hand::Right, Finger::Thumb));
            Style::default().fg(colors.fg()).bg(finger_color(assignment))
        } else {
            Style::default().fg(colors.text_pending()).bg(colors.bg())
        };
        if is_down {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }

    fn wide_key_style(&self, lit: bool) -> Style {
        let colors = &self.theme.colors;
        if lit {
            Style::default()
                .fg(colors.bg())
                .bg(colors.hint_key())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text_pending()).bg(colors.bg())
        }
    }
}

impl Widget for KeyboardDiagram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = match self.hint {
            Some(hint) => format!(" {} ", hint.finger.describe()),
            None => format!(" {} ", self.model.name),
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(if self.hint.is_some() {
                colors.hint_key()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = if self.compact {
            self.model.letter_rows()
        } else {
            &self.model.rows[..]
        };
        if inner.height < rows.len() as u16 + 1 || inner.width < 40 {
            return;
        }

        let key_width: u16 = 3;
        // Row stagger; the number row sits flush left
        let offsets: &[u16] = if self.compact { &[1, 2, 3] } else { &[0, 1, 2, 3] };

        for (row_idx, row) in rows.iter().enumerate() {
            let y = inner.y + row_idx as u16;
            let offset = offsets.get(row_idx).copied().unwrap_or(0);
            for (col_idx, key) in row.iter().enumerate() {
                let x = inner.x + offset + col_idx as u16 * key_width;
                if x + key_width > inner.x + inner.width {
                    break;
                }
                buf.set_string(x, y, format!(" {} ", key.base), self.key_style(key));
            }
        }

        let y = inner.y + rows.len() as u16;
        let shift = self.hint.and_then(|h| h.shift);
        let space_lit = self.hint.is_some_and(|h| h.key == ' ');

        buf.set_string(
            inner.x,
            y,
            " shift ",
            self.wide_key_style(shift == Some(Hand::Left)),
        );
        let space_x = inner.x + 9;
        buf.set_string(space_x, y, format!("{:^17}", "space"), {
            let style = self.wide_key_style(space_lit);
            if self.depressed_keys.contains(&' ') {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            }
        });
        let right_shift_x = space_x + 19;
        if right_shift_x + 7 <= inner.x + inner.width {
            buf.set_string(
                right_shift_x,
                y,
                " shift ",
                self.wide_key_style(shift == Some(Hand::Right)),
            );
        }
    }
}
