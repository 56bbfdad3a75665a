use crate::cli::commands::usage;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::engine::coerce_numeric;
use crate::domain::{Displayable, Entry, EntryField, UnknownField};

const ENTRY_USAGE: &str = "entry <add|remove|set|pay> <name> [field value|amount]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "entry",
        "Add, remove, or edit entities in the open period",
        "entry add <name> | entry remove <name> | entry set <name> <previous|new|rate|paid> <value> | entry pay <name> <amount>",
        cmd_entry,
    )]
}

fn cmd_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage(ENTRY_USAGE));
    };
    match action.to_lowercase().as_str() {
        "add" => add_entry(context, rest),
        "remove" | "rm" => remove_entry(context, rest),
        "set" => set_entry_field(context, rest),
        "pay" => record_payment(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown entry action `{}` ({})",
            other, ENTRY_USAGE
        ))),
    }
}

fn add_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("entry add <name>"));
    }
    let name = args.join(" ");
    let entry = context.session.add_entity(&name)?;
    output::success(format!(
        "Added `{}` at rate {}",
        entry.name,
        context.money(entry.rate)
    ));
    Ok(())
}

fn remove_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("entry remove <name>"));
    }
    let removed = context.session.remove_entity(&args.join(" "))?;
    output::success(format!("Removed {}", removed.display_label()));
    Ok(())
}

fn set_entry_field(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, field, value] = args else {
        return Err(usage(
            "entry set <name> <previous|new|rate|paid> <value> (quote names with spaces)",
        ));
    };
    let field: EntryField = field
        .parse()
        .map_err(|err: UnknownField| CommandError::InvalidArguments(err.to_string()))?;
    let entry = context.session.set_field(name, field, value)?;
    output::success(format!(
        "{}: {} = {}",
        entry.name,
        field,
        entry.field(field)
    ));
    print_balance(context, &entry);
    Ok(())
}

fn record_payment(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, amount] = args else {
        return Err(usage("entry pay <name> <amount> (quote names with spaces)"));
    };
    let amount = coerce_numeric(amount);
    let entry = context.session.record_payment(name, amount)?;
    output::success(format!(
        "Recorded {} from `{}`",
        context.money(amount),
        entry.name
    ));
    print_balance(context, &entry);
    Ok(())
}

fn print_balance(context: &ShellContext, entry: &Entry) {
    output::info(format!(
        "  units {} | sales {} | paid {} | balance {}",
        entry.consumed_units(),
        context.money(entry.sales_amount()),
        context.money(entry.amount_paid),
        context.money(entry.balance())
    ));
}
