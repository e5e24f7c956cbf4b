use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

pub const KEYBOARD_LAYOUTS: &[&str] = &["qwerty", "dvorak", "colemak"];

pub const PRACTICE_LENGTH_RANGE: (usize, usize) = (5, 200);
pub const HINT_DELAY_RANGE: (u64, u64) = (1, 30);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_practice_length")]
    pub practice_length: usize,
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: u32,
    #[serde(default = "default_hint_delay_secs")]
    pub hint_delay_secs: u64,
    #[serde(default = "default_true")]
    pub hints_enabled: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
}

fn default_practice_length() -> usize {
    30
}
fn default_min_accuracy() -> u32 {
    90
}
fn default_hint_delay_secs() -> u64 {
    3
}
fn default_true() -> bool {
    true
}
fn default_keyboard_layout() -> String {
    "qwerty".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            practice_length: default_practice_length(),
            min_accuracy: default_min_accuracy(),
            hint_delay_secs: default_hint_delay_secs(),
            hints_enabled: default_true(),
            sound_enabled: default_true(),
            keyboard_layout: default_keyboard_layout(),
        }
    }
}

impl Settings {
    /// Load from the user config dir. Unreadable or malformed files fall back
    /// to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Settings::default();
        }
        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(toml::from_str::<Settings>(&content)?));
        match parsed {
            Ok(mut settings) => {
                settings.validate();
                settings
            }
            Err(e) => {
                warn!("ignoring settings at {}: {e}", path.display());
                Settings::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keystep")
            .join("config.toml")
    }

    /// Clamp numeric fields to usable ranges and reset unknown layouts.
    pub fn validate(&mut self) {
        self.practice_length = self
            .practice_length
            .clamp(PRACTICE_LENGTH_RANGE.0, PRACTICE_LENGTH_RANGE.1);
        self.min_accuracy = self.min_accuracy.min(100);
        self.hint_delay_secs = self
            .hint_delay_secs
            .clamp(HINT_DELAY_RANGE.0, HINT_DELAY_RANGE.1);
        if !KEYBOARD_LAYOUTS.contains(&self.keyboard_layout.as_str()) {
            self.keyboard_layout = default_keyboard_layout();
        }
    }

    pub fn hint_delay(&self) -> Duration {
        Duration::from_secs(self.hint_delay_secs)
    }

    /// Copy onto `self` only the fields that differ between `before` and `after`.
    /// Returns true if any field was copied.
    pub fn apply_edits(&mut self, before: &Settings, after: &Settings) -> bool {
        let mut changed = false;
        if before.practice_length != after.practice_length {
            self.practice_length = after.practice_length;
            changed = true;
        }
        if before.min_accuracy != after.min_accuracy {
            self.min_accuracy = after.min_accuracy;
            changed = true;
        }
        if before.hint_delay_secs != after.hint_delay_secs {
            self.hint_delay_secs = after.hint_delay_secs;
            changed = true;
        }
        if before.hints_enabled != after.hints_enabled {
            self.hints_enabled = after.hints_enabled;
            changed = true;
        }
        if before.sound_enabled != after.sound_enabled {
            self.sound_enabled = after.sound_enabled;
            changed = true;
        }
        if before.keyboard_layout != after.keyboard_layout {
            self.keyboard_layout = after.keyboard_layout.clone();
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_serde_defaults_from_empty() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.practice_length, 30);
        assert_eq!(settings.min_accuracy, 90);
        assert_eq!(settings.hint_delay_secs, 3);
    }

    #[test]
    fn test_settings_partial_file_keeps_other_defaults() {
        let toml_str = r#"
min_accuracy = 80
keyboard_layout = "dvorak"
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.min_accuracy, 80);
        assert_eq!(settings.keyboard_layout, "dvorak");
        assert_eq!(settings.practice_length, 30);
        assert!(settings.hints_enabled);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut settings = Settings {
            practice_length: 0,
            min_accuracy: 250,
            hint_delay_secs: 999,
            keyboard_layout: "workman".to_string(),
            ..Settings::default()
        };
        settings.validate();
        assert_eq!(settings.practice_length, 5);
        assert_eq!(settings.min_accuracy, 100);
        assert_eq!(settings.hint_delay_secs, 30);
        assert_eq!(settings.keyboard_layout, "qwerty");
    }

    #[test]
    fn test_load_malformed_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "practice_length = \"lots\"\n[[[").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = Settings {
            practice_length: 50,
            hints_enabled: false,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_apply_edits_copies_only_changed_fields() {
        let file = Settings::default();
        let session = Settings {
            min_accuracy: 50,
            hints_enabled: false,
            ..Settings::default()
        };
        let edited = Settings {
            keyboard_layout: "dvorak".to_string(),
            ..session.clone()
        };

        let mut saved = file.clone();
        assert!(!saved.apply_edits(&session, &session));
        assert_eq!(saved, file);

        assert!(saved.apply_edits(&session, &edited));
        assert_eq!(saved.keyboard_layout, "dvorak");
        assert_eq!(saved.min_accuracy, 90);
        assert!(saved.hints_enabled);
    }
}
