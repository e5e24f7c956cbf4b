use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;
use keystep::keyboard::display;
use keystep::session::game::GameState;
use keystep::session::input::CharStatus;

pub struct TypingArea<'a> {
    state: &'a GameState,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(state: &'a GameState, title: &'a str, theme: &'a Theme) -> Self {
        Self {
            state,
            title,
            theme,
        }
    }
}

/// The glyph drawn at `idx`: the typed char for mistakes, the target otherwise.
/// Whitespace targets keep their marker so the line shape stays stable.
fn glyph_at(state: &GameState, idx: usize) -> char {
    let target = state.target[idx];
    match state.input.get(idx) {
        Some(CharStatus::Incorrect(actual)) if !target.is_whitespace() => {
            display::typed_glyph(*actual)
        }
        _ if target == display::SPACE => target,
        _ => display::typed_glyph(target),
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let state = self.state;

        let spans: Vec<Span> = (0..state.target.len())
            .map(|idx| {
                let style = if idx < state.cursor {
                    match &state.input[idx] {
                        CharStatus::Correct => Style::default().fg(colors.text_correct()),
                        CharStatus::Incorrect(_) => Style::default()
                            .fg(colors.text_incorrect())
                            .bg(colors.text_incorrect_bg())
                            .add_modifier(Modifier::UNDERLINED),
                    }
                } else if idx == state.cursor {
                    Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg())
                } else {
                    Style::default().fg(colors.text_pending())
                };
                Span::styled(glyph_at(state, idx).to_string(), style)
            })
            .collect();

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use keystep::config::Settings;
    use keystep::curriculum::{Curriculum, LevelKey};
    use keystep::engine::progress::UserProgress;
    use keystep::session::game::TypingGame;
    use keystep::session::input::Keystroke;

    #[test]
    fn test_glyphs_show_mistakes_but_keep_spaces() {
        let mut game = TypingGame::new(Curriculum::default(), Settings::default());
        let mut progress = UserProgress::default();
        let now = Instant::now();
        game.start_with_target(LevelKey::FIRST, "a b", now).unwrap();
        game.handle_key(Keystroke::char('x'), now, &mut progress);
        game.handle_key(Keystroke::char('q'), now, &mut progress);

        let state = game.state();
        assert_eq!(glyph_at(state, 0), 'x');
        assert_eq!(glyph_at(state, 1), ' ');
        assert_eq!(glyph_at(state, 2), 'b');
    }
}
