use chrono::Local;

use crate::cli::commands::{report, usage};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::{Displayable, PeriodKey};
use crate::errors::LedgerError;

const PERIOD_USAGE: &str = "period <new|open|list|save|close> [args]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "period",
        "Start, open, list, save, or close billing periods",
        "period new [company] [month] [year] | period open <key> | period list | period save [company month year] | period close",
        cmd_period,
    )]
}

fn cmd_period(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage(PERIOD_USAGE));
    };
    match action.to_lowercase().as_str() {
        "new" | "start" => new_period(context, rest),
        "open" | "load" => open_period(context, rest),
        "list" | "ls" => list_periods(context),
        "save" => save_period(context, rest),
        "close" => close_period(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown period action `{}` ({})",
            other, PERIOD_USAGE
        ))),
    }
}

/// Fills in the company from config and the month/year from the local clock.
fn identifier_parts(context: &ShellContext, args: &[&str]) -> Result<Vec<String>, CommandError> {
    let mut parts: Vec<String> = args.iter().map(|part| part.to_string()).collect();
    if parts.is_empty() {
        let company = context
            .config
            .default_company
            .clone()
            .ok_or_else(|| usage("period new <company> [month] [year]"))?;
        parts.push(company);
    }
    let now = Local::now();
    if parts.len() == 1 {
        parts.push(now.format("%B").to_string());
    }
    if parts.len() == 2 {
        parts.push(now.format("%Y").to_string());
    }
    Ok(parts)
}

fn new_period(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parts = identifier_parts(context, args)?;
    if !context.confirm_discard("Start a new period")? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    let key = context.session.start(&parts)?;
    if context.session.store().exists(&key) {
        output::warning(format!(
            "Period `{}` already exists; saving will replace it.",
            key
        ));
    }
    output::success(format!("Started period `{}`", key));
    Ok(())
}

fn open_period(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = match args {
        [] => return Err(usage("period open <key>")),
        [single] => PeriodKey::parse(single),
        many => PeriodKey::from_parts(many),
    }
    .ok_or(CommandError::Core(LedgerError::InvalidIdentifier))?;

    if !context.confirm_discard("Open another period")? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let label = context.session.open(&key)?.display_label();
    context.remember_period(&key)?;
    output::success(format!("Opened period {}", label));
    report::print_period(context)
}

fn list_periods(context: &mut ShellContext) -> CommandResult {
    let keys = context.session.list()?;
    if keys.is_empty() {
        output::info("No saved periods yet.");
        return Ok(());
    }
    output::section("Saved periods");
    let current = context.session.current_key();
    for key in &keys {
        let marker = if Some(key) == current { "*" } else { " " };
        output::raw(format!("{} {}", marker, key));
    }
    Ok(())
}

fn save_period(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = if args.is_empty() {
        context.session.save()?
    } else {
        context.session.save_as(args)?
    };
    context.remember_period(&key)?;
    output::success(format!("Period `{}` saved", key));
    Ok(())
}

fn close_period(context: &mut ShellContext) -> CommandResult {
    if context.session.current_key().is_none() {
        return Err(CommandError::NoPeriodOpen);
    }
    if !context.confirm_discard("Close the period")? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    context.session.close();
    output::info("Period closed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use tempfile::tempdir;

    #[test]
    fn new_period_uses_default_company() {
        let home = tempdir().unwrap();
        let app = process_script(
            home.path().to_path_buf(),
            &["config set default_company Acme", "period new"],
        )
        .unwrap();
        let key = app.session.current_key().unwrap().to_string();
        assert!(key.starts_with("Acme_"), "{key}");
        assert_eq!(key.split('_').count(), 3);
    }

    #[test]
    fn save_as_renames_and_open_reloads() {
        let home = tempdir().unwrap();
        let app = process_script(
            home.path().to_path_buf(),
            &[
                "period new Acme May 2024",
                "entry add North",
                "period save Acme June 2024",
                "period close",
                "period open Acme_June_2024",
            ],
        )
        .unwrap();
        assert_eq!(
            app.session.current_key().map(|key| key.to_string()).as_deref(),
            Some("Acme_June_2024")
        );
        assert_eq!(app.session.current().unwrap().len(), 1);
        assert!(!home.path().join("periods").join("Acme_May_2024.csv").exists());
    }
}
