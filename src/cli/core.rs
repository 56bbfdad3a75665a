use std::{io, path::PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use crate::{
    cli::{
        commands,
        output::{self, OutputPreferences},
        registry::CommandRegistry,
    },
    config::{Config, ConfigManager},
    core::{services::ServiceError, session::PeriodSession, utils::PathResolver},
    domain::{Displayable, PeriodKey},
    errors::LedgerError,
    storage::CsvStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Shell state for one operator: preferences, the command table, and the
/// period session.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: PeriodSession,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub theme: ColorfulTheme,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    /// Builds the shell against an explicit application home. Fails when the
    /// store directory cannot be created.
    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        output::set_preferences(OutputPreferences {
            plain: mode == CliMode::Script,
        });
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        let store = CsvStore::open(config.resolve_store_dir(config_manager.base_dir()))?;
        let session = PeriodSession::new(Box::new(store)).with_default_rate(config.default_rate);

        let mut context = Self {
            mode,
            registry: commands::registry(),
            session,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.auto_open_last();
        Ok(context)
    }

    fn auto_open_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(key) = self
            .config
            .last_opened_period
            .as_deref()
            .and_then(PeriodKey::parse)
        else {
            return;
        };
        if !self.session.store().exists(&key) {
            return;
        }
        match self.session.open(&key) {
            Ok(table) => output::info(format!("Reopened period {}.", table.display_label())),
            Err(err) => tracing::warn!(key = %key, error = %err, "could not reopen last period"),
        }
    }

    pub fn prompt(&self) -> String {
        match self.session.current_key() {
            Some(key) if self.session.is_dirty() => format!("meter_ledger [{}*]> ", key),
            Some(key) => format!("meter_ledger [{}]> ", key),
            None => "meter_ledger> ".to_string(),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn currency(&self) -> &str {
        &self.config.currency_symbol
    }

    pub fn money(&self, value: f64) -> String {
        output::format_money(self.currency(), value)
    }

    /// Remembers the period the operator last worked on.
    pub fn remember_period(&mut self, key: &PeriodKey) -> Result<(), CommandError> {
        self.config.last_opened_period = Some(key.to_string());
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// True when there is nothing unsaved or the operator agreed to drop it.
    /// Script mode never prompts.
    pub fn confirm_discard(&self, action: &str) -> Result<bool, CommandError> {
        if !self.session.is_dirty() || self.mode == CliMode::Script {
            return Ok(true);
        }
        let prompt = format!("The open period has unsaved changes. {} anyway?", action);
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm_discard("Exit").map_err(CliError::from)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NoPeriodOpen => {
                output::error("No period open.");
                output::hint("Try `period new <company>` or `period open <key>` first.");
            }
            CommandError::Core(LedgerError::NotFound(key)) => {
                output::warning(format!("No data yet for period `{}`.", key));
                output::hint("Use `period list` to see saved periods.");
            }
            CommandError::Core(LedgerError::InvalidIdentifier) => {
                output::warning("Period identifier must not be blank.");
            }
            other => output::error(other),
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::execute_line(self, line)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No period open. Use `period new` or `period open` first.")]
    NoPeriodOpen,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(err) => CommandError::Core(err),
            ServiceError::NoPeriodOpen => CommandError::NoPeriodOpen,
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

/// Fatal shell errors; these end the process.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("Line editor error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Core(LedgerError::Io(err))
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryField;
    use tempfile::tempdir;

    #[test]
    fn script_builds_and_saves_a_period() {
        let home = tempdir().unwrap();
        let app = process_script(
            home.path().to_path_buf(),
            &[
                "config set default_rate 2",
                "period new Acme May 2024",
                "entry add North",
                "entry set North previous 100",
                "entry set North new 150",
                "entry pay North 80",
                "period save",
            ],
        )
        .expect("script runs");

        assert!(!app.session.is_dirty());
        let view = app.session.view().unwrap();
        assert_eq!(view.total_sales, 100.0);
        assert_eq!(view.rows[0].field(EntryField::AmountPaid), 80.0);
        assert!(home.path().join("periods").join("Acme_May_2024.csv").is_file());
        assert_eq!(app.config.last_opened_period.as_deref(), Some("Acme_May_2024"));
    }

    #[test]
    fn errors_do_not_stop_the_script() {
        let home = tempdir().unwrap();
        let app = process_script(
            home.path().to_path_buf(),
            &[
                "entry add Orphan",
                "period open Missing_June",
                "bogus",
                "period new Acme June",
                "entry add Kiosk",
            ],
        )
        .expect("script runs");
        assert_eq!(app.session.current().unwrap().len(), 1);
    }

    #[test]
    fn exit_stops_processing() {
        let home = tempdir().unwrap();
        let app = process_script(
            home.path().to_path_buf(),
            &["period new Acme July", "exit", "entry add Late"],
        )
        .expect("script runs");
        assert!(app.session.current().unwrap().is_empty());
    }

    #[test]
    fn prompt_marks_unsaved_changes() {
        let home = tempdir().unwrap();
        let mut app = process_script(home.path().to_path_buf(), &["period new Acme May 2024"]).unwrap();
        assert_eq!(app.prompt(), "meter_ledger [Acme_May_2024*]> ");
        app.process_line("period save").unwrap();
        assert_eq!(app.prompt(), "meter_ledger [Acme_May_2024]> ");
    }
}
