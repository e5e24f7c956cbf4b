use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::ui::theme::Theme;
use keystep::engine::progress::Advance;
use keystep::session::game::GameStatus;
use keystep::session::result::SessionResult;

/// Popup shown over the typing screen once the practice text is finished.
pub struct ResultOverlay<'a> {
    result: &'a SessionResult,
    status: GameStatus,
    advance: Option<Advance>,
    min_accuracy: u32,
    theme: &'a Theme,
}

impl<'a> ResultOverlay<'a> {
    pub fn new(
        result: &'a SessionResult,
        status: GameStatus,
        advance: Option<Advance>,
        min_accuracy: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            result,
            status,
            advance,
            min_accuracy,
            theme,
        }
    }
}

impl Widget for ResultOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let (title, headline, headline_color) = match self.status {
            GameStatus::Completed => (
                " Curriculum Complete ",
                "Every level passed!".to_string(),
                colors.success(),
            ),
            GameStatus::LevelSuccess => (
                " Level Passed ",
                match self.advance {
                    Some(Advance::Unlocked(next)) => format!("Level {next} unlocked"),
                    _ => "Well done".to_string(),
                },
                colors.success(),
            ),
            _ => (
                " Level Failed ",
                format!("Reach {}% accuracy to pass", self.min_accuracy),
                colors.error(),
            ),
        };

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(headline_color))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            headline,
            Style::default()
                .fg(headline_color)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Speed:    ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} WPM", self.result.wpm),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(layout[1], buf);

        let acc_color = if self.result.accuracy >= self.min_accuracy {
            colors.success()
        } else {
            colors.error()
        };
        Paragraph::new(Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}%", self.result.accuracy),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ({}/{} correct)",
                    self.result.correct, self.result.total_chars
                ),
                Style::default().fg(colors.text_pending()),
            ),
        ]))
        .render(layout[2], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}s", self.result.elapsed_secs),
                Style::default().fg(colors.fg()),
            ),
        ]))
        .render(layout[3], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Errors:   ", Style::default().fg(colors.fg())),
            Span::styled(
                self.result.errors.to_string(),
                Style::default().fg(if self.result.errors == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]))
        .render(layout[4], buf);

        let mut help = Vec::new();
        if matches!(self.advance, Some(Advance::Unlocked(_) | Advance::AlreadyUnlocked(_))) {
            help.push(Span::styled(
                "  [Enter] Next level",
                Style::default().fg(colors.accent()),
            ));
        }
        help.push(Span::styled("  [r] Retry", Style::default().fg(colors.accent())));
        help.push(Span::styled("  [Esc] Levels", Style::default().fg(colors.accent())));
        Paragraph::new(Line::from(help)).render(layout[6], buf);
    }
}
