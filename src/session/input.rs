use crate::keyboard::display::{BACKSPACE, ENTER, TAB};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Correct,
    Incorrect(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Meta,
}

/// A key as the typing engine sees it, independent of the terminal backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    CapsLock,
    Modifier(ModifierKey),
    Other,
}

impl Key {
    /// Keys that never count as an attempt at the next character.
    pub fn is_modifier_only(self) -> bool {
        matches!(self, Key::Modifier(_) | Key::CapsLock | Key::Tab)
    }

    /// The character recorded in the input log for this key.
    pub fn typed_char(self) -> char {
        match self {
            Key::Char(ch) => ch,
            Key::Enter => ENTER,
            Key::Backspace => BACKSPACE,
            Key::Tab => TAB,
            _ => char::REPLACEMENT_CHARACTER,
        }
    }

    pub fn matches(self, expected: char) -> bool {
        matches!(self, Key::Char(ch) if ch == expected)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keystroke {
    pub key: Key,
    /// Auto-repeat from a held key.
    pub repeat: bool,
}

impl Keystroke {
    pub fn press(key: Key) -> Self {
        Self { key, repeat: false }
    }

    pub fn char(ch: char) -> Self {
        Self::press(Key::Char(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_only_keys() {
        for key in [
            Key::Modifier(ModifierKey::Shift),
            Key::Modifier(ModifierKey::Control),
            Key::Modifier(ModifierKey::Alt),
            Key::Modifier(ModifierKey::Meta),
            Key::CapsLock,
            Key::Tab,
        ] {
            assert!(key.is_modifier_only(), "{key:?}");
        }
        assert!(!Key::Char('a').is_modifier_only());
        assert!(!Key::Enter.is_modifier_only());
        assert!(!Key::Backspace.is_modifier_only());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(Key::Char('a').matches('a'));
        assert!(!Key::Char('A').matches('a'));
        assert!(!Key::Enter.matches('\n'));
    }

    #[test]
    fn test_typed_char_sentinels() {
        assert_eq!(Key::Backspace.typed_char(), '\x08');
        assert_eq!(Key::Enter.typed_char(), '\n');
        assert_eq!(Key::Other.typed_char(), char::REPLACEMENT_CHARACTER);
    }
}
