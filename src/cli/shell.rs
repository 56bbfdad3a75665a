use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::config::Config;
use crate::domain::EntryField;

const SCRIPT_ENV: &str = "METER_LEDGER_CLI_SCRIPT";

const PERIOD_ACTIONS: [&str; 5] = ["new", "open", "list", "save", "close"];
const ENTRY_ACTIONS: [&str; 4] = ["add", "remove", "set", "pay"];
const CONFIG_ACTIONS: [&str; 2] = ["show", "set"];

/// Runs the shell until `exit`, end of input, or a fatal error.
///
/// With `METER_LEDGER_CLI_SCRIPT` set, commands are read from stdin one per
/// line and nothing prompts; otherwise an interactive line editor is used.
pub fn run_cli() -> Result<(), CliError> {
    let mode = match std::env::var_os(SCRIPT_ENV) {
        Some(_) => CliMode::Script,
        None => CliMode::Interactive,
    };
    let mut context = ShellContext::new(mode)?;
    tracing::debug!(?mode, "shell started");

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor: Editor<LedgerCompleter, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(LedgerCompleter::default()));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("Type `help` to list commands.");

    while context.running {
        if let Some(helper) = editor.helper_mut() {
            helper.refresh(context);
        }
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) if context.confirm_exit()? => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.trim());
        }
        if step(context, &line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn run_script<R: BufRead>(context: &mut ShellContext, input: R) -> Result<(), CliError> {
    for line in input.lines() {
        if step(context, &line?)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one line and reports any command error; only fatal errors escape.
fn step(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match execute_line(context, line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Tokenizes and dispatches one line. Blank lines and `#` comments are no-ops.
pub(crate) fn execute_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Context-aware completion: command names first, then actions, stored
/// period keys, entity names, field names, or config keys depending on the
/// command being typed.
#[derive(Default)]
struct LedgerCompleter {
    commands: Vec<String>,
    periods: Vec<String>,
    entities: Vec<String>,
}

impl LedgerCompleter {
    /// Snapshots what can be completed from the current session.
    fn refresh(&mut self, context: &ShellContext) {
        let mut commands: Vec<String> = context
            .command_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        commands.sort();
        commands.dedup();
        self.commands = commands;
        self.periods = context
            .session
            .list()
            .map(|keys| keys.iter().map(|key| key.to_string()).collect())
            .unwrap_or_default();
        self.entities = context
            .session
            .current()
            .map(|table| table.entries.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_default();
    }

    fn candidates(&self, words: &[&str]) -> Vec<String> {
        match words {
            [] => self.commands.clone(),
            ["period"] => owned(&PERIOD_ACTIONS),
            ["period", "open"] => self.periods.clone(),
            ["compare"] | ["compare", _] => self.periods.clone(),
            ["entry"] => owned(&ENTRY_ACTIONS),
            ["entry", action] if *action != "add" => self.entities.clone(),
            ["entry", "set", _] => EntryField::ALL.iter().map(|field| field.to_string()).collect(),
            ["config"] => owned(&CONFIG_ACTIONS),
            ["config", "set"] => owned(&Config::SETTABLE_KEYS),
            ["help"] => self.commands.clone(),
            _ => Vec::new(),
        }
    }
}

impl Completer for LedgerCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let words: Vec<String> = prefix[..start]
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let needle = prefix[start..].to_lowercase();

        let matches = self
            .candidates(&words)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: quote_if_needed(&candidate),
            })
            .collect();
        Ok((start, matches))
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn quote_if_needed(word: &str) -> String {
    if word.contains(char::is_whitespace) {
        format!("\"{}\"", word)
    } else {
        word.to_string()
    }
}

impl Hinter for LedgerCompleter {
    type Hint = String;
}

impl Highlighter for LedgerCompleter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for LedgerCompleter {}

impl Helper for LedgerCompleter {}

/// Splits a line into words with shell quoting rules.
pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    shell_words::split(input).map_err(|err| ParseError(err.to_string()))
}

#[derive(Debug)]
pub(crate) struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not parse line: {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> LedgerCompleter {
        LedgerCompleter {
            commands: vec!["compare".into(), "config".into(), "entry".into(), "period".into()],
            periods: vec!["Acme_April_2024".into(), "Acme_May_2024".into()],
            entities: vec!["Blue Lake Kiosk".into(), "North".into()],
        }
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line(r#"entry add "Blue Lake Kiosk""#).unwrap();
        assert_eq!(tokens, ["entry", "add", "Blue Lake Kiosk"]);
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(parse_command_line(r#"entry add "Blue"#).is_err());
    }

    #[test]
    fn completion_follows_the_command_being_typed() {
        let completer = completer();
        assert_eq!(completer.candidates(&[]).len(), 4);
        assert_eq!(completer.candidates(&["period", "open"]).len(), 2);
        assert_eq!(completer.candidates(&["compare", "Acme_May_2024"]).len(), 2);
        assert_eq!(
            completer.candidates(&["entry", "pay"]),
            ["Blue Lake Kiosk", "North"]
        );
        assert!(completer.candidates(&["entry", "add"]).is_empty());
        assert_eq!(
            completer.candidates(&["entry", "set", "north"]),
            ["previous_reading", "new_reading", "rate", "amount_paid"]
        );
        assert!(completer.candidates(&["show", "x"]).is_empty());
    }

    #[test]
    fn names_with_spaces_are_quoted() {
        assert_eq!(quote_if_needed("Blue Lake Kiosk"), "\"Blue Lake Kiosk\"");
        assert_eq!(quote_if_needed("North"), "North");
    }
}
