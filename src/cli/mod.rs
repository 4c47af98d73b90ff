//! Command-line interface module.

mod args;
pub mod clean;
pub mod show;

pub use args::{CleanArgs, Cli, Commands};
