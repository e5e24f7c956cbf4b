#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn label(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }

    pub fn opposite(self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Pinky,
    Ring,
    Middle,
    Index,
    Thumb,
}

impl Finger {
    pub fn label(self) -> &'static str {
        match self {
            Finger::Pinky => "pinky",
            Finger::Ring => "ring finger",
            Finger::Middle => "middle finger",
            Finger::Index => "index finger",
            Finger::Thumb => "thumb",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerAssignment {
    pub hand: Hand,
    pub finger: Finger,
}

impl FingerAssignment {
    pub fn new(hand: Hand, finger: Finger) -> Self {
        Self { hand, finger }
    }

    /// e.g. "left index finger"
    pub fn describe(self) -> String {
        format!("{} {}", self.hand.label(), self.finger.label())
    }
}

/// Touch-typing finger for a column of the staggered key grid.
///
/// `col` is counted from the first letter column of the row (Q, A or Z on
/// QWERTY); the number row starts one column further left at the backtick.
pub fn finger_for_column(row: usize, col: usize) -> FingerAssignment {
    use Finger::*;
    use Hand::*;

    let col = if row == 0 { col.saturating_sub(1) } else { col };
    match col {
        0 => FingerAssignment::new(Left, Pinky),
        1 => FingerAssignment::new(Left, Ring),
        2 => FingerAssignment::new(Left, Middle),
        3 | 4 => FingerAssignment::new(Left, Index),
        5 | 6 => FingerAssignment::new(Right, Index),
        7 => FingerAssignment::new(Right, Middle),
        8 => FingerAssignment::new(Right, Ring),
        _ => FingerAssignment::new(Right, Pinky),
    }
}
