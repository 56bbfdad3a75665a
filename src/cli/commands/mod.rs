pub mod config;
pub mod entry;
pub mod period;
pub mod report;
pub mod system;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandRegistry;

/// Builds the command table in the order `help` lists it.
pub fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    let groups = [
        period::definitions(),
        entry::definitions(),
        report::definitions(),
        config::definitions(),
        system::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
    registry
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", text))
}
