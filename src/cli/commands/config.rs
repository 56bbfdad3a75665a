use crate::cli::commands::usage;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change shell preferences",
        "config [show|set <currency_symbol|default_rate|default_company|store_dir> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.split_first() {
        None => show_config(context),
        Some((action, _)) if action.eq_ignore_ascii_case("show") => show_config(context),
        Some((action, rest)) if action.eq_ignore_ascii_case("set") => set_config(context, rest),
        Some((other, _)) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    let store_dir = config.resolve_store_dir(context.config_manager.base_dir());
    output::section("Configuration");
    output::raw(format!("currency_symbol    : {}", config.currency_symbol));
    output::raw(format!("default_rate       : {}", config.default_rate));
    output::raw(format!(
        "default_company    : {}",
        config.default_company.as_deref().unwrap_or("(none)")
    ));
    output::raw(format!("store_dir          : {}", store_dir.display()));
    output::raw(format!(
        "last_opened_period : {}",
        config.last_opened_period.as_deref().unwrap_or("(none)")
    ));
    output::raw(format!(
        "config file        : {}",
        context.config_manager.path().display()
    ));
    Ok(())
}

fn set_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((key, value)) = args.split_first() else {
        return Err(usage("config set <key> <value>"));
    };
    let key = key.to_lowercase();
    let value = value.join(" ");
    context.config.set(&key, &value)?;
    context.config_manager.save(&context.config)?;
    tracing::debug!(key = %key, "config updated");

    match key.as_str() {
        "default_rate" => {
            context.session.set_default_rate(context.config.default_rate);
            output::success(format!(
                "default_rate set to {} for new entities",
                context.config.default_rate
            ));
        }
        "store_dir" => {
            output::success("store_dir updated");
            output::hint("The new store directory is used the next time the shell starts.");
        }
        _ => output::success(format!("{} updated", key)),
    }
    Ok(())
}
