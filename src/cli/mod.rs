//! Interactive shell over the period session.

pub mod commands;
pub mod core;
pub mod output;
pub mod registry;
mod shell;
pub mod table;

pub use shell::run_cli;
