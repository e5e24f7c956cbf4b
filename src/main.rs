mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{error, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use app::{App, AppScreen, keystroke_from_event};
use event::{AppEvent, EventHandler};
use keystep::config::Settings;
use keystep::curriculum::LevelKey;
use keystep::sound::TerminalBell;
use keystep::store::json_store::JsonStore;
use ui::components::keyboard_diagram::KeyboardDiagram;
use ui::components::level_select::LevelSelect;
use ui::components::progress_bar::ProgressBar;
use ui::components::result_overlay::ResultOverlay;
use ui::components::stats_sidebar::StatsSidebar;
use ui::components::typing_area::TypingArea;
use ui::layout::{AppLayout, centered_rect};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "keystep",
    version,
    about = "Terminal touch-typing trainer with a level-by-level key curriculum"
)]
struct Cli {
    #[arg(long, help = "Keys per practice text")]
    length: Option<usize>,

    #[arg(long, help = "Accuracy percentage needed to pass a level")]
    min_accuracy: Option<u32>,

    #[arg(long, help = "Seconds of inactivity before the key hint appears")]
    hint_delay: Option<u64>,

    #[arg(long, help = "Never show key hints")]
    no_hints: bool,

    #[arg(long, value_name = "CHAPTER-LEVEL", help = "Start straight into an unlocked level, e.g. 0-2")]
    level: Option<LevelKey>,

    #[arg(long, help = "Delete saved progress and history before starting")]
    reset_progress: bool,

    #[arg(long, value_name = "PATH", help = "Log file (default: <data dir>/keystep/keystep.log)")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| JsonStore::default_dir().join("keystep.log"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone())?;

    let file_settings = Settings::load();
    let mut settings = file_settings.clone();
    if let Some(length) = cli.length {
        settings.practice_length = length;
    }
    if let Some(min_accuracy) = cli.min_accuracy {
        settings.min_accuracy = min_accuracy;
    }
    if let Some(delay) = cli.hint_delay {
        settings.hint_delay_secs = delay;
    }
    if cli.no_hints {
        settings.hints_enabled = false;
    }
    settings.validate();

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("progress will not be saved: {e:#}");
            None
        }
    };
    if cli.reset_progress
        && let Some(ref store) = store
    {
        store.reset()?;
    }

    // Muting is checked per keystroke so the settings screen can toggle it
    let sound = Box::new(TerminalBell::stdout());
    let mut app = App::new(settings, store, Theme::load(), sound)
        .with_saved_settings(file_settings, Settings::config_path());
    info!("keystep started");

    if let Some(level) = cli.level {
        app.start_level(level);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Release and repeat events need the enhanced protocol
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref err) = result {
        error!("exiting with error: {err:#}");
    }
    info!("keystep stopped");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => {
                // Terminals without release events: let go after 150ms
                if let Some(last) = app.last_key_time
                    && last.elapsed() > Duration::from_millis(150)
                {
                    app.depressed_keys.clear();
                    app.last_key_time = None;
                }
            }
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match (&key.code, key.kind) {
        (KeyCode::Char(ch), KeyEventKind::Press) => {
            app.depressed_keys.insert(ch.to_ascii_lowercase());
            app.last_key_time = Some(Instant::now());
        }
        (KeyCode::Char(ch), KeyEventKind::Release) => {
            app.depressed_keys.remove(&ch.to_ascii_lowercase());
            return;
        }
        (_, KeyEventKind::Release) => return,
        _ => {}
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::LevelSelect => handle_level_select_key(app, key),
        AppScreen::Playing if app.is_finished() => handle_result_key(app, key),
        AppScreen::Playing => handle_playing_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_level_select_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_level(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_level(),
        KeyCode::Enter | KeyCode::Char(' ') => app.start_selected_level(),
        KeyCode::Char('s') => app.go_to_settings(),
        KeyCode::Char('R') => app.reset_progress(),
        _ => {}
    }
}

fn handle_playing_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        if key.kind == KeyEventKind::Press {
            app.go_to_level_select();
        }
        return;
    }
    app.type_key(keystroke_from_event(&key));
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('n') => app.next_level(),
        KeyCode::Char('r') => app.retry_level(),
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_level_select(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < app::SETTINGS_FIELDS {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::LevelSelect => render_level_select(frame, app),
        AppScreen::Playing => render_playing(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn header_line<'a>(title: String, info: String, app: &App) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn render_level_select(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    let info = format!(
        " {}/{} levels unlocked | {} sessions played",
        app.progress.unlocked_count(),
        app.curriculum.total_levels(),
        app.history.sessions.len(),
    );
    frame.render_widget(header_line(" keystep ".to_string(), info, app), layout[0]);

    let completed = app.progress.completed_count();
    let bar = ProgressBar::new(
        "Curriculum",
        app.progress.completion_ratio(&app.curriculum),
        &app.theme,
    )
    .caption(format!(
        "{completed}/{} levels passed",
        app.curriculum.total_levels()
    ));
    frame.render_widget(bar, layout[1]);

    let list_area = centered_rect(70, 100, 60, 10, layout[2]);
    frame.render_widget(
        LevelSelect::new(&app.curriculum, &app.progress, app.selected_level, &app.theme),
        list_area,
    );

    let footer = match app.status_message {
        Some(ref msg) => Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(colors.warning()),
        )),
        None => Line::from(Span::styled(
            " [Enter] Play  [\u{2191}\u{2193}/jk] Navigate  [s] Settings  [R] Reset progress  [q] Quit ",
            Style::default().fg(colors.text_pending()),
        )),
    };
    frame.render_widget(Paragraph::new(footer), layout[3]);
}

fn render_playing(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let state = app.game.state();
    let now = Instant::now();

    let app_layout = AppLayout::new(area);
    let tier = app_layout.tier;

    let title = app
        .game
        .level()
        .map(|l| format!(" Level {} {} ", state.level, l.title))
        .unwrap_or_default();
    let info = if tier.show_sidebar() {
        format!(" Pass at {}%", app.settings.min_accuracy)
    } else {
        format!(
            " WPM: {} | Acc: {}% | Errors: {}",
            state.stats.wpm, state.stats.accuracy, state.stats.errors
        )
    };
    frame.render_widget(header_line(title, info, app), app_layout.header);

    let show_kbd = tier.show_keyboard(area.height);
    let compact = area.height < 26;
    let mut constraints = vec![Constraint::Min(5), Constraint::Length(3)];
    if show_kbd {
        constraints.push(Constraint::Length(KeyboardDiagram::height(compact)));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    let description = app.game.level().map(|l| l.description).unwrap_or("");
    frame.render_widget(TypingArea::new(state, description, &app.theme), main_layout[0]);

    let bar = ProgressBar::new("Progress", state.progress(), &app.theme).caption(format!(
        "{}/{}",
        state.cursor,
        state.target.len()
    ));
    frame.render_widget(bar, main_layout[1]);

    if show_kbd {
        let level_keys: Vec<char> = app
            .game
            .level()
            .map(|l| {
                l.config
                    .new_keys
                    .iter()
                    .chain(l.config.review_keys)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        let kbd = KeyboardDiagram::new(
            &app.keyboard_model,
            app.visible_hint(),
            &level_keys,
            &app.depressed_keys,
            &app.theme,
        )
        .compact(compact);
        frame.render_widget(kbd, main_layout[2]);
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = StatsSidebar::new(
            state,
            app.progress.record(state.level),
            app.history.attempts(state.level),
            app.settings.min_accuracy,
            now,
            &app.theme,
        );
        frame.render_widget(sidebar, sidebar_area);
    }

    let footer_text = if app.is_playing() {
        " [Esc] Back to levels "
    } else {
        " [Enter] Next  [r] Retry  [Esc] Levels "
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer_text,
            Style::default().fg(colors.text_pending()),
        ))),
        app_layout.footer,
    );

    if app.is_finished()
        && let Some(ref result) = app.last_result
    {
        let popup = centered_rect(50, 50, 48, 12, area);
        let overlay = ResultOverlay::new(
            result,
            app.game.status(),
            app.game.last_advance(),
            app.settings.min_accuracy,
            &app.theme,
        );
        frame.render_widget(overlay, popup);
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(60, 80, 50, 24, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = app.settings_fields();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.text_pending()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.hint_key()
        } else {
            colors.text_pending()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )))
    .render(layout[3], frame.buffer_mut());
}
