use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;
use keystep::engine::progress::LevelRecord;
use keystep::session::game::GameState;

pub struct StatsSidebar<'a> {
    state: &'a GameState,
    record: Option<&'a LevelRecord>,
    attempts: usize,
    min_accuracy: u32,
    now: Instant,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        state: &'a GameState,
        record: Option<&'a LevelRecord>,
        attempts: usize,
        min_accuracy: u32,
        now: Instant,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            record,
            attempts,
            min_accuracy,
            now,
            theme,
        }
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stats = &self.state.stats;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(12), Constraint::Length(7)])
            .split(area);

        let acc_color = if stats.accuracy >= self.min_accuracy {
            colors.success()
        } else if stats.accuracy + 10 >= self.min_accuracy {
            colors.warning()
        } else {
            colors.error()
        };
        let elapsed = stats.elapsed(self.state.finished_at.unwrap_or(self.now));

        let lines = vec![
            Line::from(vec![
                Span::styled("WPM: ", Style::default().fg(colors.fg())),
                Span::styled(stats.wpm.to_string(), Style::default().fg(colors.accent())),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Accuracy: ", Style::default().fg(colors.fg())),
                Span::styled(format!("{}%", stats.accuracy), Style::default().fg(acc_color)),
                Span::styled(
                    format!(" / {}%", self.min_accuracy),
                    Style::default().fg(colors.text_pending()),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Progress: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{}/{}", self.state.cursor, self.state.target.len()),
                    Style::default().fg(colors.accent()),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Correct: ", Style::default().fg(colors.fg())),
                Span::styled(
                    stats.correct_chars.to_string(),
                    Style::default().fg(colors.success()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Errors:  ", Style::default().fg(colors.fg())),
                Span::styled(stats.errors.to_string(), Style::default().fg(colors.error())),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Time: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{:.1}s", elapsed.as_secs_f64()),
                    Style::default().fg(colors.fg()),
                ),
            ]),
        ];

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Stats ")
                    .border_style(Style::default().fg(colors.border()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(sections[0], buf);

        let mut best_lines = match self.record.filter(|r| r.completed) {
            Some(record) => vec![
                Line::from(vec![
                    Span::styled("WPM: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        record.best_wpm.to_string(),
                        Style::default().fg(colors.accent()),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Accuracy: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        format!("{}%", record.best_accuracy),
                        Style::default().fg(colors.success()),
                    ),
                ]),
            ],
            None => vec![Line::from(Span::styled(
                "Not passed yet",
                Style::default().fg(colors.text_pending()),
            ))],
        };
        best_lines.push(Line::from(vec![
            Span::styled("Attempts: ", Style::default().fg(colors.fg())),
            Span::styled(
                self.attempts.to_string(),
                Style::default().fg(colors.fg()),
            ),
        ]));

        Paragraph::new(best_lines)
            .block(
                Block::bordered()
                    .title(" Best ")
                    .border_style(Style::default().fg(colors.border()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(sections[1], buf);
    }
}
