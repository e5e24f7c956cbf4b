pub mod progress;
pub mod sequence;
pub mod stats;
