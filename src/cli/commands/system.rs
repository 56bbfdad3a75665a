use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::cli::table::{Table, TableColumn};
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandEntry::new("quit", "Exit the shell", "quit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Meter Ledger {}", meta.version));
    output::raw(meta.summary());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.registry.get(&name.to_lowercase()) {
            Some(entry) => {
                output::section(entry.name);
                output::raw(entry.description);
                output::raw(format!("usage: {}", entry.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    print_overview(&context.registry);
    Ok(())
}

fn print_overview(registry: &CommandRegistry) {
    output::section("Commands");
    let mut table = Table::new(vec![
        TableColumn::left("Command"),
        TableColumn::left("Description"),
    ]);
    for entry in registry.list() {
        table.push_row(vec![entry.name.to_string(), entry.description.to_string()]);
    }
    output::raw(table.render());
    output::hint("Use `help <command>` for usage details.");
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm_discard("Exit")? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    Err(CommandError::ExitRequested)
}

#[cfg(test)]
mod tests {
    use crate::cli::commands::registry;

    #[test]
    fn every_command_has_usage() {
        let registry = registry();
        let names: Vec<_> = registry.names().collect();
        for expected in ["period", "entry", "show", "total", "compare", "config", "help", "exit"] {
            assert!(names.contains(&expected), "{expected}");
        }
        assert!(registry.list().iter().all(|entry| !entry.usage.is_empty()));
    }
}
