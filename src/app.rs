use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use log::{error, info, warn};

use crate::ui::theme::Theme;
use keystep::config::{HINT_DELAY_RANGE, KEYBOARD_LAYOUTS, PRACTICE_LENGTH_RANGE, Settings};
use keystep::curriculum::{Curriculum, LevelKey};
use keystep::engine::progress::{Advance, UserProgress};
use keystep::keyboard::model::{KeyHint, KeyboardModel};
use keystep::session::game::{GameStatus, KeyOutcome, TypingGame};
use keystep::session::input::{Key, Keystroke, ModifierKey};
use keystep::session::result::SessionResult;
use keystep::sound::{SoundEffect, SoundPlayer};
use keystep::store::json_store::JsonStore;
use keystep::store::schema::HistoryData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    LevelSelect,
    Playing,
    Settings,
}

pub const SETTINGS_FIELDS: usize = 6;

pub struct App {
    pub screen: AppScreen,
    pub theme: Theme,
    pub settings: Settings,
    pub curriculum: Curriculum,
    pub progress: UserProgress,
    pub history: HistoryData,
    pub game: TypingGame,
    pub keyboard_model: KeyboardModel,
    pub selected_level: LevelKey,
    pub settings_selected: usize,
    pub last_result: Option<SessionResult>,
    pub status_message: Option<String>,
    pub depressed_keys: HashSet<char>,
    pub last_key_time: Option<Instant>,
    pub should_quit: bool,
    store: Option<JsonStore>,
    sound: Box<dyn SoundPlayer>,
    /// What the config file holds, without command-line overrides.
    saved_settings: Settings,
    settings_path: PathBuf,
    settings_on_entry: Settings,
}

impl App {
    pub fn new(
        settings: Settings,
        store: Option<JsonStore>,
        theme: Theme,
        sound: Box<dyn SoundPlayer>,
    ) -> Self {
        let curriculum = Curriculum::default();
        let (progress, history) = match store {
            Some(ref s) => (s.load_progress(), s.load_history()),
            None => (UserProgress::default(), HistoryData::default()),
        };
        let selected_level = progress.latest_unlocked(&curriculum);
        let keyboard_model = KeyboardModel::from_name(&settings.keyboard_layout);
        let game = TypingGame::new(curriculum, settings.clone());
        let saved_settings = settings.clone();
        let settings_on_entry = settings.clone();

        Self {
            screen: AppScreen::LevelSelect,
            theme,
            settings,
            curriculum,
            progress,
            history,
            game,
            keyboard_model,
            selected_level,
            settings_selected: 0,
            last_result: None,
            status_message: None,
            depressed_keys: HashSet::new(),
            last_key_time: None,
            should_quit: false,
            store,
            sound,
            saved_settings,
            settings_path: Settings::config_path(),
            settings_on_entry,
        }
    }

    /// Use `saved` as the file contents that settings edits are merged into,
    /// written back to `path`.
    pub fn with_saved_settings(mut self, saved: Settings, path: PathBuf) -> Self {
        self.saved_settings = saved;
        self.settings_path = path;
        self
    }

    pub fn start_level(&mut self, key: LevelKey) {
        self.status_message = None;
        self.last_result = None;
        match self.game.start_level(key, &self.progress, Instant::now()) {
            Ok(()) => {
                self.selected_level = key;
                self.screen = AppScreen::Playing;
            }
            Err(e) => {
                warn!("could not start level {key}: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    pub fn start_selected_level(&mut self) {
        self.start_level(self.selected_level);
    }

    pub fn type_key(&mut self, stroke: Keystroke) {
        let outcome = self
            .game
            .handle_key(stroke, Instant::now(), &mut self.progress);
        if self.settings.sound_enabled
            && let Some(effect) = SoundEffect::for_outcome(outcome)
        {
            self.sound.play(effect);
        }
        if let KeyOutcome::Finished(_) = outcome {
            self.finish_level();
        }
    }

    fn finish_level(&mut self) {
        let Some(result) = self.game.result(Instant::now()) else {
            return;
        };
        self.history.push(result.clone());
        self.last_result = Some(result);
        if let Some(Advance::Unlocked(next) | Advance::AlreadyUnlocked(next)) =
            self.game.last_advance()
        {
            self.selected_level = next;
        }
        self.save_data();
    }

    fn save_data(&self) {
        let Some(ref store) = self.store else {
            return;
        };
        if let Err(e) = store.save_progress(&self.progress) {
            error!("failed to save progress: {e:#}");
        }
        if let Err(e) = store.save_history(&self.history) {
            error!("failed to save history: {e:#}");
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.game.tick(now);
    }

    /// The overlay hint for the next expected key, once the idle delay has passed.
    pub fn visible_hint(&self) -> Option<KeyHint> {
        let state = self.game.state();
        if !state.show_hint {
            return None;
        }
        state
            .expected_char()
            .and_then(|ch| self.keyboard_model.hint_for(ch))
    }

    pub fn is_finished(&self) -> bool {
        self.game.status().is_finished()
    }

    pub fn next_level(&mut self) {
        match self.game.last_advance().and_then(Advance::next_level) {
            Some(next) => self.start_level(next),
            None => self.go_to_level_select(),
        }
    }

    pub fn retry_level(&mut self) {
        self.last_result = None;
        if let Err(e) = self.game.restart(&self.progress, Instant::now()) {
            warn!("could not restart: {e}");
            self.go_to_level_select();
        }
    }

    pub fn go_to_level_select(&mut self) {
        self.game.abandon();
        self.depressed_keys.clear();
        self.screen = AppScreen::LevelSelect;
    }

    pub fn select_next_level(&mut self) {
        let keys = self.curriculum.level_keys();
        if let Some(idx) = keys.iter().position(|&k| k == self.selected_level) {
            self.selected_level = keys[(idx + 1).min(keys.len() - 1)];
        }
    }

    pub fn select_prev_level(&mut self) {
        let keys = self.curriculum.level_keys();
        if let Some(idx) = keys.iter().position(|&k| k == self.selected_level) {
            self.selected_level = keys[idx.saturating_sub(1)];
        }
    }

    pub fn reset_progress(&mut self) {
        if let Some(ref store) = self.store
            && let Err(e) = store.reset()
        {
            error!("failed to reset progress: {e:#}");
        }
        self.progress = UserProgress::default();
        self.history = HistoryData::default();
        self.selected_level = LevelKey::FIRST;
        self.status_message = Some("Progress reset".to_string());
        info!("progress reset from the level screen");
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.settings_on_entry = self.settings.clone();
        self.screen = AppScreen::Settings;
    }

    /// Apply edited settings and return to the level list. Only the fields
    /// edited on the settings screen are written to the config file.
    pub fn leave_settings(&mut self) {
        self.settings.validate();
        if self
            .saved_settings
            .apply_edits(&self.settings_on_entry, &self.settings)
            && let Err(e) = self.saved_settings.save_to(&self.settings_path)
        {
            error!("failed to save settings: {e:#}");
        }
        self.game.set_settings(self.settings.clone());
        self.keyboard_model = KeyboardModel::from_name(&self.settings.keyboard_layout);
        self.screen = AppScreen::LevelSelect;
    }

    pub fn settings_cycle_forward(&mut self) {
        self.adjust_setting(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.adjust_setting(false);
    }

    fn adjust_setting(&mut self, forward: bool) {
        let s = &mut self.settings;
        match self.settings_selected {
            0 => {
                s.practice_length = if forward {
                    (s.practice_length + 5).min(PRACTICE_LENGTH_RANGE.1)
                } else {
                    s.practice_length.saturating_sub(5).max(PRACTICE_LENGTH_RANGE.0)
                };
            }
            1 => {
                s.min_accuracy = if forward {
                    (s.min_accuracy + 5).min(100)
                } else {
                    s.min_accuracy.saturating_sub(5)
                };
            }
            2 => {
                s.hint_delay_secs = if forward {
                    (s.hint_delay_secs + 1).min(HINT_DELAY_RANGE.1)
                } else {
                    s.hint_delay_secs.saturating_sub(1).max(HINT_DELAY_RANGE.0)
                };
            }
            3 => s.hints_enabled = !s.hints_enabled,
            4 => s.sound_enabled = !s.sound_enabled,
            5 => {
                let idx = KEYBOARD_LAYOUTS
                    .iter()
                    .position(|&l| l == s.keyboard_layout)
                    .unwrap_or(0);
                let len = KEYBOARD_LAYOUTS.len();
                let next = if forward {
                    (idx + 1) % len
                } else {
                    (idx + len - 1) % len
                };
                s.keyboard_layout = KEYBOARD_LAYOUTS[next].to_string();
            }
            _ => {}
        }
    }

    pub fn settings_fields(&self) -> Vec<(&'static str, String)> {
        let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
        vec![
            ("Practice Length", format!("{} keys", self.settings.practice_length)),
            ("Pass Accuracy", format!("{}%", self.settings.min_accuracy)),
            ("Hint Delay", format!("{}s", self.settings.hint_delay_secs)),
            ("Hints", on_off(self.settings.hints_enabled)),
            ("Sound", on_off(self.settings.sound_enabled)),
            ("Keyboard Layout", self.settings.keyboard_layout.clone()),
        ]
    }

    pub fn is_playing(&self) -> bool {
        self.game.status() == GameStatus::Playing
    }
}

/// Translate a terminal key event into what the typing engine understands.
pub fn keystroke_from_event(key: &KeyEvent) -> Keystroke {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let mapped = match key.code {
        // Ctrl+Alt together is how some terminals report AltGr characters
        KeyCode::Char(ch) if ctrl && alt => Key::Char(ch),
        // Chords are shortcuts, not typing
        KeyCode::Char(_) if ctrl => Key::Modifier(ModifierKey::Control),
        KeyCode::Char(_) if alt => Key::Modifier(ModifierKey::Alt),
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::Modifier(code) => Key::Modifier(match code {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => ModifierKey::Shift,
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => ModifierKey::Control,
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => ModifierKey::Alt,
            _ => ModifierKey::Meta,
        }),
        _ => Key::Other,
    };
    Keystroke {
        key: mapped,
        repeat: key.kind == KeyEventKind::Repeat,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;
    use tempfile::TempDir;

    use super::*;
    use keystep::sound::Silent;

    fn test_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let app = App::new(
            Settings::default(),
            Some(store),
            Theme::default(),
            Box::new(Silent),
        )
        .with_saved_settings(Settings::default(), dir.path().join("config.toml"));
        (dir, app)
    }

    fn press(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn type_target(app: &mut App) {
        let target: Vec<char> = app.game.state().target.clone();
        for ch in target {
            app.type_key(Keystroke::char(ch));
        }
    }

    #[test]
    fn test_keystroke_mapping() {
        let stroke = keystroke_from_event(&press(KeyCode::Char('a'), KeyEventKind::Press));
        assert_eq!(stroke, Keystroke::char('a'));

        let repeat = keystroke_from_event(&press(KeyCode::Char('a'), KeyEventKind::Repeat));
        assert!(repeat.repeat);

        let shift = keystroke_from_event(&press(
            KeyCode::Modifier(ModifierKeyCode::RightShift),
            KeyEventKind::Press,
        ));
        assert_eq!(shift.key, Key::Modifier(ModifierKey::Shift));
        assert!(shift.key.is_modifier_only());

        let f1 = keystroke_from_event(&press(KeyCode::F(1), KeyEventKind::Press));
        assert_eq!(f1.key, Key::Other);
    }

    fn chord(ch: char, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            modifiers,
            ..press(KeyCode::Char(ch), KeyEventKind::Press)
        }
    }

    #[test]
    fn test_control_and_alt_chords_are_not_typed() {
        let ctrl_f = keystroke_from_event(&chord('f', KeyModifiers::CONTROL));
        assert_eq!(ctrl_f.key, Key::Modifier(ModifierKey::Control));
        let alt_f = keystroke_from_event(&chord('f', KeyModifiers::ALT));
        assert_eq!(alt_f.key, Key::Modifier(ModifierKey::Alt));

        let shifted = keystroke_from_event(&chord('F', KeyModifiers::SHIFT));
        assert_eq!(shifted.key, Key::Char('F'));
        let alt_gr = keystroke_from_event(&chord('@', KeyModifiers::CONTROL | KeyModifiers::ALT));
        assert_eq!(alt_gr.key, Key::Char('@'));

        let (_dir, mut app) = test_app();
        app.start_level(LevelKey::FIRST);
        let first = app.game.state().target[0];
        app.type_key(keystroke_from_event(&chord(first, KeyModifiers::CONTROL)));
        app.type_key(keystroke_from_event(&chord(first, KeyModifiers::ALT)));

        let state = app.game.state();
        assert_eq!(state.cursor, 0);
        assert!(state.input.is_empty());
        assert_eq!(state.stats.total_chars, 0);
    }

    #[test]
    fn test_starts_on_first_level() {
        let (_dir, app) = test_app();
        assert_eq!(app.screen, AppScreen::LevelSelect);
        assert_eq!(app.selected_level, LevelKey::FIRST);
    }

    #[test]
    fn test_locked_level_sets_status_message() {
        let (_dir, mut app) = test_app();
        app.start_level(LevelKey::new(2, 0));
        assert_eq!(app.screen, AppScreen::LevelSelect);
        assert!(app.status_message.as_deref().unwrap().contains("locked"));
    }

    #[test]
    fn test_passing_level_saves_and_moves_selection() {
        let (dir, mut app) = test_app();
        app.start_selected_level();
        assert_eq!(app.screen, AppScreen::Playing);
        type_target(&mut app);

        assert!(app.is_finished());
        assert_eq!(app.history.sessions.len(), 1);
        assert!(app.last_result.as_ref().unwrap().passed);
        assert_eq!(app.selected_level, LevelKey::new(0, 1));

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.load_progress().is_unlocked(LevelKey::new(0, 1)));
        assert_eq!(store.load_history().sessions.len(), 1);

        app.next_level();
        assert_eq!(app.game.state().level, LevelKey::new(0, 1));
        assert!(app.is_playing());
    }

    #[test]
    fn test_retry_keeps_level() {
        let (_dir, mut app) = test_app();
        app.start_selected_level();
        let len = app.game.state().target.len();
        for _ in 0..len {
            app.type_key(Keystroke::char('z'));
        }
        assert_eq!(app.game.status(), GameStatus::LevelFailed);

        app.retry_level();
        assert!(app.is_playing());
        assert_eq!(app.game.state().level, LevelKey::FIRST);
        assert!(app.last_result.is_none());
    }

    #[test]
    fn test_level_navigation_clamps() {
        let (_dir, mut app) = test_app();
        app.select_prev_level();
        assert_eq!(app.selected_level, LevelKey::FIRST);
        app.select_next_level();
        assert_eq!(app.selected_level, LevelKey::new(0, 1));
    }

    #[test]
    fn test_settings_adjustments_stay_in_range() {
        let (_dir, mut app) = test_app();
        app.settings_selected = 1;
        for _ in 0..5 {
            app.settings_cycle_forward();
        }
        assert_eq!(app.settings.min_accuracy, 100);

        app.settings_selected = 2;
        for _ in 0..10 {
            app.settings_cycle_backward();
        }
        assert_eq!(app.settings.hint_delay_secs, HINT_DELAY_RANGE.0);

        app.settings_selected = 5;
        app.settings_cycle_backward();
        assert_eq!(app.settings.keyboard_layout, "colemak");
        assert_eq!(app.settings_fields().len(), SETTINGS_FIELDS);
    }

    #[test]
    fn test_command_line_overrides_stay_out_of_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let session = Settings {
            min_accuracy: 50,
            hints_enabled: false,
            ..Settings::default()
        };
        let mut app = App::new(session, None, Theme::default(), Box::new(Silent))
            .with_saved_settings(Settings::default(), path.clone());

        // Visiting settings without editing anything writes nothing
        app.go_to_settings();
        app.leave_settings();
        assert!(!path.exists());
        assert_eq!(app.settings.min_accuracy, 50);

        // An edit is saved on top of the file values, not the overrides
        app.go_to_settings();
        app.settings_selected = 5;
        app.settings_cycle_forward();
        app.leave_settings();

        let on_disk = Settings::load_from(&path);
        assert_eq!(on_disk.keyboard_layout, "dvorak");
        assert_eq!(on_disk.min_accuracy, 90);
        assert!(on_disk.hints_enabled);
        assert_eq!(app.settings.min_accuracy, 50);
        assert!(!app.settings.hints_enabled);
        assert_eq!(app.keyboard_model.name, "Dvorak");
    }

    #[test]
    fn test_reset_progress_clears_history() {
        let (_dir, mut app) = test_app();
        app.start_selected_level();
        type_target(&mut app);
        app.go_to_level_select();

        app.reset_progress();
        assert_eq!(app.progress, UserProgress::default());
        assert!(app.history.sessions.is_empty());
        assert_eq!(app.selected_level, LevelKey::FIRST);
    }
}
