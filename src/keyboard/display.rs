//! Sentinel chars stand in for non-printing keys in the input log. Rendering
//! goes through the helpers below rather than matching sentinels directly.

/// Sentinel char for Backspace.
pub const BACKSPACE: char = '\x08';
/// Sentinel char for Tab.
pub const TAB: char = '\t';
/// Sentinel char for Enter.
pub const ENTER: char = '\n';
pub const SPACE: char = ' ';

/// Human-readable name for a key, e.g. "Space" or "K".
pub fn key_display_name(ch: char) -> String {
    match ch {
        BACKSPACE => "Backspace".to_string(),
        TAB => "Tab".to_string(),
        ENTER => "Enter".to_string(),
        SPACE => "Space".to_string(),
        _ => ch.to_uppercase().collect(),
    }
}

/// How a typed char is drawn in the practice text.
pub fn typed_glyph(ch: char) -> char {
    match ch {
        BACKSPACE => '\u{232b}', // ⌫
        TAB => '\u{2192}',       // →
        ENTER => '\u{21b5}',     // ↵
        SPACE => '\u{00b7}',     // ·
        c if c.is_control() => '?',
        c => c,
    }
}
