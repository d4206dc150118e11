pub mod analyze_commands;

pub use analyze_commands::*;
