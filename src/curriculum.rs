use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// --- Level Key ---

/// Position of a level inside the curriculum. Persisted as `"{chapter}-{level}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelKey {
    pub chapter: usize,
    pub level: usize,
}

impl LevelKey {
    pub const FIRST: LevelKey = LevelKey {
        chapter: 0,
        level: 0,
    };

    pub fn new(chapter: usize, level: usize) -> Self {
        Self { chapter, level }
    }

    pub fn to_key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.chapter, self.level)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelKeyError {
    #[error("level key {0:?} is not of the form <chapter>-<level>")]
    Malformed(String),
}

impl FromStr for LevelKey {
    type Err = LevelKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || LevelKeyError::Malformed(s.to_string());
        let (chapter, level) = s.split_once('-').ok_or_else(malformed)?;
        let chapter = chapter.trim().parse().map_err(|_| malformed())?;
        let level = level.trim().parse().map_err(|_| malformed())?;
        Ok(Self { chapter, level })
    }
}

// --- Static Definitions ---

/// Relative odds of drawing from the new-key pool vs the review pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub new: f64,
    pub review: f64,
}

impl Weights {
    pub const EVEN: Weights = Weights {
        new: 1.0,
        review: 1.0,
    };
}

#[derive(Clone, Copy, Debug)]
pub struct LevelConfig {
    pub new_keys: &'static [char],
    pub review_keys: &'static [char],
    pub weights: Weights,
}

impl LevelConfig {
    pub fn contains(&self, ch: char) -> bool {
        self.new_keys.contains(&ch) || self.review_keys.contains(&ch)
    }
}

pub struct LevelDefinition {
    pub title: &'static str,
    pub description: &'static str,
    pub config: LevelConfig,
}

pub struct ChapterDefinition {
    pub title: &'static str,
    pub description: &'static str,
    pub levels: &'static [LevelDefinition],
}

const NEW_HEAVY: Weights = Weights {
    new: 0.6,
    review: 0.4,
};

const HOME_ROW: &[char] = &['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';'];

const HOME_ROW_LEVELS: &[LevelDefinition] = &[
    LevelDefinition {
        title: "F and J",
        description: "Find the home bumps with your index fingers",
        config: LevelConfig {
            new_keys: &['f', 'j'],
            review_keys: &[],
            weights: Weights::EVEN,
        },
    },
    LevelDefinition {
        title: "D and K",
        description: "Middle fingers rest on D and K",
        config: LevelConfig {
            new_keys: &['d', 'k'],
            review_keys: &['f', 'j'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "S and L",
        description: "Ring fingers rest on S and L",
        config: LevelConfig {
            new_keys: &['s', 'l'],
            review_keys: &['f', 'j', 'd', 'k'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "A and ;",
        description: "Pinkies complete the home position",
        config: LevelConfig {
            new_keys: &['a', ';'],
            review_keys: &['f', 'j', 'd', 'k', 's', 'l'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "G and H",
        description: "Index fingers reach inward",
        config: LevelConfig {
            new_keys: &['g', 'h'],
            review_keys: &['a', 's', 'd', 'f', 'j', 'k', 'l', ';'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "Home Row Review",
        description: "Every home row key, mixed",
        config: LevelConfig {
            new_keys: &[],
            review_keys: HOME_ROW,
            weights: Weights::EVEN,
        },
    },
];

const TOP_ROW_LEVELS: &[LevelDefinition] = &[
    LevelDefinition {
        title: "E and I",
        description: "Middle fingers reach up",
        config: LevelConfig {
            new_keys: &['e', 'i'],
            review_keys: HOME_ROW,
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "R and U",
        description: "Index fingers reach up",
        config: LevelConfig {
            new_keys: &['r', 'u'],
            review_keys: &['a', 's', 'd', 'f', 'j', 'k', 'l', 'e', 'i'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "T and Y",
        description: "Index fingers reach up and inward",
        config: LevelConfig {
            new_keys: &['t', 'y'],
            review_keys: &['a', 's', 'd', 'f', 'j', 'k', 'l', 'e', 'i', 'r', 'u'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "W and O",
        description: "Ring fingers reach up",
        config: LevelConfig {
            new_keys: &['w', 'o'],
            review_keys: &['a', 's', 'd', 'f', 'j', 'k', 'l', 'e', 'i', 'r', 'u', 't', 'y'],
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "Q and P",
        description: "Pinkies reach up",
        config: LevelConfig {
            new_keys: &['q', 'p'],
            review_keys: &[
                'a', 's', 'd', 'f', 'j', 'k', 'l', 'e', 'i', 'r', 'u', 't', 'y', 'w', 'o',
            ],
            weights: NEW_HEAVY,
        },
    },
];

const UPPER_ROWS: &[char] = &[
    'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o',
    'p',
];

const BOTTOM_ROW_LEVELS: &[LevelDefinition] = &[
    LevelDefinition {
        title: "V and M",
        description: "Index fingers reach down",
        config: LevelConfig {
            new_keys: &['v', 'm'],
            review_keys: UPPER_ROWS,
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "C and ,",
        description: "Middle fingers reach down",
        config: LevelConfig {
            new_keys: &['c', ','],
            review_keys: UPPER_ROWS,
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "X and .",
        description: "Ring fingers reach down",
        config: LevelConfig {
            new_keys: &['x', '.'],
            review_keys: UPPER_ROWS,
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "Z and /",
        description: "Pinkies reach down",
        config: LevelConfig {
            new_keys: &['z', '/'],
            review_keys: UPPER_ROWS,
            weights: NEW_HEAVY,
        },
    },
    LevelDefinition {
        title: "B and N",
        description: "Index fingers reach down and inward",
        config: LevelConfig {
            new_keys: &['b', 'n'],
            review_keys: &[
                'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'e', 'i', 'r', 'u', 't', 'y', 'v',
                'm', 'c', 'x', 'z',
            ],
            weights: NEW_HEAVY,
        },
    },
];

const ALL_LETTERS: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const SPACE_AND_CAPITALS_LEVELS: &[LevelDefinition] = &[
    LevelDefinition {
        title: "Space Bar",
        description: "Thumbs on the space bar",
        config: LevelConfig {
            new_keys: &[' '],
            review_keys: ALL_LETTERS,
            weights: Weights {
                new: 0.2,
                review: 0.8,
            },
        },
    },
    LevelDefinition {
        title: "Right-Hand Capitals",
        description: "Hold left Shift for right-hand letters",
        config: LevelConfig {
            new_keys: &['H', 'J', 'K', 'L', 'Y', 'U', 'I', 'O', 'P', 'N', 'M'],
            review_keys: ALL_LETTERS,
            weights: Weights {
                new: 0.3,
                review: 0.7,
            },
        },
    },
    LevelDefinition {
        title: "Left-Hand Capitals",
        description: "Hold right Shift for left-hand letters",
        config: LevelConfig {
            new_keys: &[
                'A', 'S', 'D', 'F', 'G', 'Q', 'W', 'E', 'R', 'T', 'Z', 'X', 'C', 'V', 'B',
            ],
            review_keys: ALL_LETTERS,
            weights: Weights {
                new: 0.3,
                review: 0.7,
            },
        },
    },
];

const NUMBER_LEVELS: &[LevelDefinition] = &[
    LevelDefinition {
        title: "1 to 5",
        description: "Left hand climbs to the number row",
        config: LevelConfig {
            new_keys: &['1', '2', '3', '4', '5'],
            review_keys: ALL_LETTERS,
            weights: Weights::EVEN,
        },
    },
    LevelDefinition {
        title: "6 to 0",
        description: "Right hand climbs to the number row",
        config: LevelConfig {
            new_keys: &['6', '7', '8', '9', '0'],
            review_keys: &['1', '2', '3', '4', '5'],
            weights: NEW_HEAVY,
        },
    },
];

pub const CHAPTERS: &[ChapterDefinition] = &[
    ChapterDefinition {
        title: "Home Row",
        description: "Where your fingers live",
        levels: HOME_ROW_LEVELS,
    },
    ChapterDefinition {
        title: "Top Row",
        description: "Reaching up from home",
        levels: TOP_ROW_LEVELS,
    },
    ChapterDefinition {
        title: "Bottom Row",
        description: "Reaching down from home",
        levels: BOTTOM_ROW_LEVELS,
    },
    ChapterDefinition {
        title: "Space & Capitals",
        description: "Thumbs and Shift",
        levels: SPACE_AND_CAPITALS_LEVELS,
    },
    ChapterDefinition {
        title: "Numbers",
        description: "The number row",
        levels: NUMBER_LEVELS,
    },
];

// --- Curriculum ---

/// Ordered chapters of levels. Cheap to copy; the definitions are static.
#[derive(Clone, Copy)]
pub struct Curriculum {
    chapters: &'static [ChapterDefinition],
}

impl Curriculum {
    pub fn new(chapters: &'static [ChapterDefinition]) -> Self {
        Self { chapters }
    }

    pub fn chapters(&self) -> &'static [ChapterDefinition] {
        self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&'static ChapterDefinition> {
        self.chapters.get(index)
    }

    pub fn level(&self, key: LevelKey) -> Option<&'static LevelDefinition> {
        self.chapter(key.chapter)?.levels.get(key.level)
    }

    /// The level after `key`: next in its chapter, else the first level of
    /// the next non-empty chapter.
    pub fn next_level_key(&self, key: LevelKey) -> Option<LevelKey> {
        let chapter = self.chapter(key.chapter)?;
        if key.level + 1 < chapter.levels.len() {
            return Some(LevelKey::new(key.chapter, key.level + 1));
        }
        (key.chapter + 1..self.chapters.len())
            .find(|&idx| !self.chapters[idx].levels.is_empty())
            .map(|idx| LevelKey::new(idx, 0))
    }

    pub fn has_next_level(&self, key: LevelKey) -> bool {
        self.next_level_key(key).is_some()
    }

    /// Every level key in curriculum order.
    pub fn level_keys(&self) -> Vec<LevelKey> {
        self.chapters
            .iter()
            .enumerate()
            .flat_map(|(c, chapter)| (0..chapter.levels.len()).map(move |l| LevelKey::new(c, l)))
            .collect()
    }

    pub fn total_levels(&self) -> usize {
        self.chapters.iter().map(|c| c.levels.len()).sum()
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self::new(CHAPTERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_key_display_and_parse() {
        let key = LevelKey::new(2, 11);
        assert_eq!(key.to_string(), "2-11");
        assert_eq!("2-11".parse::<LevelKey>(), Ok(key));
    }

    #[test]
    fn test_level_key_rejects_garbage() {
        assert!("".parse::<LevelKey>().is_err());
        assert!("3".parse::<LevelKey>().is_err());
        assert!("a-b".parse::<LevelKey>().is_err());
        assert!("-1-0".parse::<LevelKey>().is_err());
    }

    #[test]
    fn test_next_level_within_chapter() {
        let curriculum = Curriculum::default();
        assert_eq!(
            curriculum.next_level_key(LevelKey::new(0, 0)),
            Some(LevelKey::new(0, 1))
        );
    }

    #[test]
    fn test_next_level_crosses_chapter() {
        let curriculum = Curriculum::default();
        let last_in_first = LevelKey::new(0, HOME_ROW_LEVELS.len() - 1);
        assert_eq!(
            curriculum.next_level_key(last_in_first),
            Some(LevelKey::new(1, 0))
        );
    }

    #[test]
    fn test_no_next_after_final_level() {
        let curriculum = Curriculum::default();
        let last = *curriculum.level_keys().last().unwrap();
        assert_eq!(curriculum.next_level_key(last), None);
        assert!(!curriculum.has_next_level(last));
    }

    #[test]
    fn test_next_level_skips_empty_chapters() {
        static SPARSE: &[ChapterDefinition] = &[
            ChapterDefinition {
                title: "One",
                description: "",
                levels: &[LevelDefinition {
                    title: "only",
                    description: "",
                    config: LevelConfig {
                        new_keys: &['a'],
                        review_keys: &[],
                        weights: Weights::EVEN,
                    },
                }],
            },
            ChapterDefinition {
                title: "Empty",
                description: "",
                levels: &[],
            },
            ChapterDefinition {
                title: "Three",
                description: "",
                levels: &[LevelDefinition {
                    title: "only",
                    description: "",
                    config: LevelConfig {
                        new_keys: &['b'],
                        review_keys: &[],
                        weights: Weights::EVEN,
                    },
                }],
            },
        ];
        let curriculum = Curriculum::new(SPARSE);
        assert_eq!(
            curriculum.next_level_key(LevelKey::FIRST),
            Some(LevelKey::new(2, 0))
        );
    }

    #[test]
    fn test_every_level_has_keys() {
        let curriculum = Curriculum::default();
        for key in curriculum.level_keys() {
            let level = curriculum.level(key).unwrap();
            assert!(
                !level.config.new_keys.is_empty() || !level.config.review_keys.is_empty(),
                "level {key} has no keys"
            );
        }
        assert_eq!(curriculum.level_keys().len(), curriculum.total_levels());
    }
}
