//! Command-line surface: argument parsing and the interactive loop

pub mod args;
mod repl;

pub use args::{Cli, Commands};
pub use repl::Repl;
