pub mod game;
pub mod hint;
pub mod input;
pub mod result;
