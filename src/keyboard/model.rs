use crate::keyboard::finger::{self, Finger, FingerAssignment, Hand};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalKey {
    pub base: char,
    pub shifted: char,
}

/// What the hint overlay should light up for one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyHint {
    /// Unshifted label of the physical key to press.
    pub key: char,
    /// The Shift key to hold, if any (always on the other hand).
    pub shift: Option<Hand>,
    pub finger: FingerAssignment,
}

#[derive(Clone, Debug)]
pub struct KeyboardModel {
    pub name: &'static str,
    pub rows: Vec<Vec<PhysicalKey>>,
}

fn row(base: &str, shifted: &str) -> Vec<PhysicalKey> {
    base.chars()
        .zip(shifted.chars())
        .map(|(base, shifted)| PhysicalKey { base, shifted })
        .collect()
}

impl KeyboardModel {
    pub fn qwerty() -> Self {
        Self {
            name: "QWERTY",
            rows: vec![
                row("`1234567890-=", "~!@#$%^&*()_+"),
                row("qwertyuiop[]\\", "QWERTYUIOP{}|"),
                row("asdfghjkl;'", "ASDFGHJKL:\""),
                row("zxcvbnm,./", "ZXCVBNM<>?"),
            ],
        }
    }

    pub fn dvorak() -> Self {
        Self {
            name: "Dvorak",
            rows: vec![
                row("`1234567890[]", "~!@#$%^&*(){}"),
                row("',.pyfgcrl/=\\", "\"<>PYFGCRL?+|"),
                row("aoeuidhtns-", "AOEUIDHTNS_"),
                row(";qjkxbmwvz", ":QJKXBMWVZ"),
            ],
        }
    }

    pub fn colemak() -> Self {
        Self {
            name: "Colemak",
            rows: vec![
                row("`1234567890-=", "~!@#$%^&*()_+"),
                row("qwfpgjluy;[]\\", "QWFPGJLUY:{}|"),
                row("arstdhneio'", "ARSTDHNEIO\""),
                row("zxcvbkm,./", "ZXCVBKM<>?"),
            ],
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dvorak" => Self::dvorak(),
            "colemak" => Self::colemak(),
            _ => Self::qwerty(),
        }
    }

    fn find_key_position(&self, ch: char) -> Option<(usize, usize)> {
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, key) in row.iter().enumerate() {
                if key.base == ch || key.shifted == ch {
                    return Some((row_idx, col_idx));
                }
            }
        }
        None
    }

    pub fn finger_for_char(&self, ch: char) -> Option<FingerAssignment> {
        if ch == ' ' {
            return Some(FingerAssignment::new(Hand::Right, Finger::Thumb));
        }
        self.find_key_position(ch)
            .map(|(row, col)| finger::finger_for_column(row, col))
    }

    /// Key, finger and Shift needed to type `ch`, or None if the layout has
    /// no key for it.
    pub fn hint_for(&self, ch: char) -> Option<KeyHint> {
        if ch == ' ' {
            return Some(KeyHint {
                key: ' ',
                shift: None,
                finger: FingerAssignment::new(Hand::Right, Finger::Thumb),
            });
        }
        let (row, col) = self.find_key_position(ch)?;
        let key = &self.rows[row][col];
        let finger = finger::finger_for_column(row, col);
        let shift = (key.shifted == ch && key.base != ch).then(|| finger.hand.opposite());
        Some(KeyHint {
            key: key.base,
            shift,
            finger,
        })
    }

    /// Letter rows (without the number row), for the compact diagram.
    pub fn letter_rows(&self) -> &[Vec<PhysicalKey>] {
        if self.rows.len() > 1 {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }
}

impl Default for KeyboardModel {
    fn default() -> Self {
        Self::qwerty()
    }
}
