use crate::cli::commands::usage;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::domain::PeriodKey;
use crate::errors::LedgerError;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "show",
            "Show the open period with derived columns",
            "show",
            cmd_show,
        ),
        CommandEntry::new(
            "total",
            "Show column totals for the open period",
            "total",
            cmd_total,
        ),
        CommandEntry::new(
            "compare",
            "Compare total sales of two saved periods",
            "compare <period> <period>",
            cmd_compare,
        ),
    ]
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    print_period(context)
}

/// Renders the open period as a table followed by its total sales.
pub(crate) fn print_period(context: &ShellContext) -> CommandResult {
    let view = context.session.view()?;
    output::section(format!("Period {}", view.key));
    if view.rows.is_empty() {
        output::info("No entries yet. Use `entry add <name>`.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Name").max_width(24),
        TableColumn::right("Previous"),
        TableColumn::right("New"),
        TableColumn::right("Units"),
        TableColumn::right("Rate"),
        TableColumn::right("Sales"),
        TableColumn::right("Paid"),
        TableColumn::right("Balance"),
    ]);
    for row in &view.rows {
        table.push_row(vec![
            row.name.clone(),
            row.previous_reading.to_string(),
            row.new_reading.to_string(),
            row.consumed_units().to_string(),
            context.money(row.rate),
            context.money(row.sales_amount()),
            context.money(row.amount_paid),
            context.money(row.balance()),
        ]);
    }
    output::raw(table.render());
    output::raw(format!("Total sales: {}", context.money(view.total_sales)));
    Ok(())
}

fn cmd_total(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let totals = context.session.totals()?;
    output::section("Totals");
    output::raw(format!("Entries     : {}", totals.rows));
    output::raw(format!("Units       : {}", totals.consumed_units));
    output::raw(format!("Total sales : {}", context.money(totals.sales)));
    output::raw(format!("Paid        : {}", context.money(totals.paid)));
    output::raw(format!("Outstanding : {}", context.money(totals.outstanding)));
    Ok(())
}

fn cmd_compare(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [left, right] = args else {
        return Err(usage("compare <period> <period>"));
    };
    let parse = |value: &str| {
        PeriodKey::parse(value).ok_or(CommandError::Core(LedgerError::InvalidIdentifier))
    };
    let (left, right) = (parse(*left)?, parse(*right)?);
    let comparison = context.session.compare(&left, &right)?;

    output::section("Comparison");
    output::raw(format!(
        "{}: {}",
        comparison.left,
        context.money(comparison.left_total)
    ));
    output::raw(format!(
        "{}: {}",
        comparison.right,
        context.money(comparison.right_total)
    ));
    output::raw(format!("Difference: {}", context.money(comparison.difference)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use tempfile::tempdir;

    #[test]
    fn show_and_total_need_an_open_period() {
        let home = tempdir().unwrap();
        let mut app = process_script(home.path().to_path_buf(), &["show", "total"]).unwrap();
        assert!(app.process_line("compare Acme_March").is_err());
        assert!(app.process_line("compare Acme_March Acme_April").is_err());
    }
}
