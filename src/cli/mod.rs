//! Line-oriented command shell around the ledger.

pub mod commands;
mod core;
mod help;
pub mod output;
mod shell;

pub use self::core::{CliError, CliMode, CommandError};
pub use shell::run_cli;
