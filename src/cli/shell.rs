use std::{
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
use shell_words::split;

use crate::cli::commands::{FORM_NAMES, LIST_RESOURCES};
use crate::cli::core::{ActiveForm, CliError, CliMode, CommandError, FormKind, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::domain::TIME_SLOTS;

/// Set to run commands from stdin without line editing.
pub const SCRIPT_ENV: &str = "ECM_ADMIN_CLI_SCRIPT";

/// Commands that act on the open form; their hint names it.
const FORM_ACTIONS: &[&str] = &["show", "validate", "submit", "reset", "close"];
const ROW_ACTIONS: &[&str] = &["add", "set", "remove"];
const CONFIG_ACTIONS: &[&str] = &["show", "set"];
const CONFIG_KEYS: &[&str] = &["api_url", "timeout", "token"];
const CLASSROOM_SCOPES: &[&str] = &["admin", "staff"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::from_context(context)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();

                let control = handle_line(context, trimmed);
                // the open form may have changed
                if let Some(helper) = editor.helper_mut() {
                    helper.refresh(context);
                }
                match control {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                output_info("Interrupted. Type `exit` to leave the shell.");
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        match handle_line(context, &line?) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            context.print_warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };

    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

/// Field names of the open form, as the completer needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormVocabulary {
    label: String,
    fields: Vec<&'static str>,
    lists: Vec<(&'static str, Vec<String>)>,
    takes_slots: bool,
}

impl FormVocabulary {
    fn from_active(active: &ActiveForm) -> Self {
        let schema = active.session.schema();
        Self {
            label: active.label(),
            fields: schema
                .fields
                .iter()
                .filter(|field| !field.is_list())
                .map(|field| field.key)
                .collect(),
            lists: schema
                .fields
                .iter()
                .filter(|field| field.is_list())
                .map(|field| {
                    let keys = field.row_keys().into_iter().map(str::to_string).collect();
                    (field.key, keys)
                })
                .collect(),
            takes_slots: matches!(active.kind, FormKind::Schedule(_)),
        }
    }

    fn row_keys(&self, field: &str) -> Vec<String> {
        self.lists
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, keys)| keys.clone())
            .unwrap_or_default()
    }
}

/// Tab completion and usage hints. Knows the command set and, after each
/// command, the fields of whatever form is open.
struct ShellHelper {
    commands: Vec<(&'static str, &'static str)>,
    form: Option<FormVocabulary>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl ShellHelper {
    fn from_context(context: &ShellContext) -> Self {
        let mut helper = Self {
            commands: context
                .registry
                .iter()
                .map(|command| (command.name, command.arguments()))
                .collect(),
            form: None,
        };
        helper.refresh(context);
        helper
    }

    fn refresh(&mut self, context: &ShellContext) {
        self.form = context.active.as_ref().map(FormVocabulary::from_active);
    }

    fn command_names(&self) -> Vec<String> {
        self.commands.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Everything that may follow the completed `words`.
    fn candidates(&self, words: &[&str]) -> Vec<String> {
        let form = self.form.as_ref();
        match words {
            [] | ["help"] => self.command_names(),
            ["open"] => owned(FORM_NAMES),
            ["open", "classroom", _] => owned(CLASSROOM_SCOPES),
            ["list"] => owned(LIST_RESOURCES),
            ["config"] => owned(CONFIG_ACTIONS),
            ["config", "set"] => owned(CONFIG_KEYS),
            ["set"] => form.map(|form| owned(&form.fields)).unwrap_or_default(),
            ["row"] => owned(ROW_ACTIONS),
            ["row", _] => form
                .map(|form| form.lists.iter().map(|(key, _)| key.to_string()).collect())
                .unwrap_or_default(),
            ["row", "set", field, _] => form.map(|form| form.row_keys(field)).unwrap_or_default(),
            ["slot"] if form.is_some_and(|form| form.takes_slots) => {
                TIME_SLOTS.iter().map(|slot| slot.id.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Start of the word under the cursor and the candidates matching it.
    fn completions(&self, prefix: &str) -> (usize, Vec<String>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let lowered = prefix[..start].to_ascii_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let needle = prefix[start..].to_ascii_lowercase();
        let matches = self
            .candidates(&words)
            .into_iter()
            .filter(|candidate| candidate.starts_with(&needle))
            .collect();
        (start, matches)
    }

    /// Usage after a bare command, or the open form's label for form actions.
    fn hint_for(&self, line: &str) -> Option<String> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_ascii_lowercase();
        if words.next().is_some() {
            return None;
        }
        let (_, arguments) = self.commands.iter().find(|(name, _)| *name == command)?;
        if line.ends_with(char::is_whitespace) {
            return (!arguments.is_empty()).then(|| arguments.to_string());
        }
        match &self.form {
            Some(form) if FORM_ACTIONS.contains(&command.as_str()) => {
                Some(format!("  ({})", form.label))
            }
            _ => None,
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.completions(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.hint_for(line)
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
