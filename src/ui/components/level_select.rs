use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;
use keystep::curriculum::{Curriculum, LevelKey};
use keystep::engine::progress::UserProgress;
use keystep::keyboard::display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LevelStatus {
    Locked,
    Available,
    Completed,
}

pub struct LevelSelect<'a> {
    curriculum: &'a Curriculum,
    progress: &'a UserProgress,
    selected: LevelKey,
    theme: &'a Theme,
}

impl<'a> LevelSelect<'a> {
    pub fn new(
        curriculum: &'a Curriculum,
        progress: &'a UserProgress,
        selected: LevelKey,
        theme: &'a Theme,
    ) -> Self {
        Self {
            curriculum,
            progress,
            selected,
            theme,
        }
    }

    fn status(&self, key: LevelKey) -> LevelStatus {
        if self.progress.is_completed(key) {
            LevelStatus::Completed
        } else if self.progress.is_unlocked(key) {
            LevelStatus::Available
        } else {
            LevelStatus::Locked
        }
    }
}

impl Widget for LevelSelect<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Levels ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(5),
            ])
            .split(inner);

        self.render_level_list(layout[0], buf);

        Paragraph::new(Line::from(Span::styled(
            "\u{2500}".repeat(layout[1].width as usize),
            Style::default().fg(colors.border()),
        )))
        .render(layout[1], buf);

        self.render_detail_panel(layout[2], buf);
    }
}

impl LevelSelect<'_> {
    fn render_level_list(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines: Vec<Line> = Vec::new();
        let mut selected_line = 0usize;

        for (chapter_idx, chapter) in self.curriculum.chapters().iter().enumerate() {
            let done = (0..chapter.levels.len())
                .filter(|&l| self.progress.is_completed(LevelKey::new(chapter_idx, l)))
                .count();
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}", chapter.title),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {done}/{}", chapter.levels.len()),
                    Style::default().fg(colors.text_pending()),
                ),
            ]));

            for (level_idx, level) in chapter.levels.iter().enumerate() {
                let key = LevelKey::new(chapter_idx, level_idx);
                let is_selected = key == self.selected;
                if is_selected {
                    selected_line = lines.len();
                }

                let (prefix, base) = match self.status(key) {
                    LevelStatus::Completed => ("\u{2605} ", Style::default().fg(colors.success())),
                    LevelStatus::Available => ("\u{25b6} ", Style::default().fg(colors.fg())),
                    LevelStatus::Locked => ("\u{00b7} ", Style::default().fg(colors.locked())),
                };
                let style = if is_selected {
                    base.add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    base
                };
                let indicator = if is_selected { "> " } else { "  " };

                let mut spans = vec![Span::styled(
                    format!("  {indicator}{prefix}{key} {}", level.title),
                    style,
                )];
                if let Some(record) = self.progress.record(key).filter(|r| r.completed) {
                    spans.push(Span::styled(
                        format!(
                            "  {}% {} wpm",
                            record.best_accuracy, record.best_wpm
                        ),
                        Style::default().fg(colors.text_pending()),
                    ));
                }
                lines.push(Line::from(spans));
            }
        }

        // Keep the selection in view
        let height = area.height as usize;
        let scroll = selected_line.saturating_sub(height.saturating_sub(2));
        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .render(area, buf);
    }

    fn render_detail_panel(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(level) = self.curriculum.level(self.selected) else {
            return;
        };

        let key_list = |keys: &[char]| -> String {
            keys.iter()
                .map(|&c| display::key_display_name(c))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("  {}", level.title),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("  {}", level.description),
                Style::default().fg(colors.fg()),
            )),
            Line::from(vec![
                Span::styled("  New: ", Style::default().fg(colors.fg())),
                Span::styled(
                    key_list(level.config.new_keys),
                    Style::default().fg(colors.hint_key()),
                ),
            ]),
        ];
        if !level.config.review_keys.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("  Review: ", Style::default().fg(colors.fg())),
                Span::styled(
                    key_list(level.config.review_keys),
                    Style::default().fg(colors.text_pending()),
                ),
            ]));
        }
        let status = match self.status(self.selected) {
            LevelStatus::Locked => Some("  Locked: pass the previous level first"),
            _ => None,
        };
        if let Some(status) = status {
            lines.push(Line::from(Span::styled(
                status,
                Style::default().fg(colors.warning()),
            )));
        }

        Paragraph::new(lines).render(area, buf);
    }
}
