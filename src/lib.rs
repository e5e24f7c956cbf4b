//! Typing-practice engine: curriculum, sequence generation, keystroke
//! matching, statistics and level progress. The terminal front end lives in
//! the binary (`main.rs`, `app.rs`, `ui/`).

pub mod config;
pub mod curriculum;
pub mod engine;
pub mod keyboard;
pub mod session;
pub mod sound;
pub mod store;
