//! Core CLI loop, dispatch, and shell context helpers.

use std::{future::Future, io, sync::Arc};

use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tokio::runtime::{Builder, Runtime};

use crate::{
    api::{ClassroomApi, HttpApiClient},
    config::{Config, ConfigManager},
    context::AppContext,
    domain::Displayable,
    errors::{ApiError, ConfigError, FormError},
    form::{FieldError, FormFlow, FormSession, SessionMode, SubmitOutcome},
    wizards::{ClassroomWizard, ScheduleWizard, StudentWizard, TeacherWizard},
};

use super::commands::{all_definitions, CommandRegistry};
use super::output;

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

/// Dialog currently open in the shell, with the API its submit goes to.
pub(crate) enum FormKind {
    Student(StudentWizard),
    Teacher(TeacherWizard),
    Classroom {
        wizard: ClassroomWizard,
        api: ClassroomApi,
    },
    Schedule(ScheduleWizard),
}

pub(crate) struct ActiveForm {
    pub kind: FormKind,
    pub session: FormSession,
}

impl ActiveForm {
    pub(crate) fn open(kind: FormKind) -> Self {
        let session = match &kind {
            FormKind::Student(wizard) => wizard.open_session(),
            FormKind::Teacher(wizard) => wizard.open_session(),
            FormKind::Classroom { wizard, .. } => wizard.open_session(),
            FormKind::Schedule(wizard) => wizard.open_session(),
        };
        Self { kind, session }
    }

    pub(crate) fn label(&self) -> String {
        let name = self.session.schema().name;
        match self.session.mode() {
            SessionMode::Create => format!("{name}:new"),
            SessionMode::Edit { id } => format!("{name}:{id}"),
        }
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config_manager: ConfigManager,
    pub app: AppContext,
    pub(crate) active: Option<ActiveForm>,
    runtime: Runtime,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::from_env()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?.with_env_overrides();
        let app = build_app(config)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;

        Ok(Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            config_manager,
            app,
            active: None,
            runtime,
            last_command: None,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        match &self.active {
            Some(active) => format!("ecm [{}]> ", active.label()),
            None => "ecm> ".to_string(),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(definition) = self.registry.get(command) {
            let handler = definition.handler;
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

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let lowered = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &lowered), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NoActiveForm => {
                output::error(CommandError::NoActiveForm);
                output::info("Try `open student` to get started.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        output::warning(message);
    }

    pub(crate) fn active_form(&self) -> Result<&ActiveForm, CommandError> {
        self.active.as_ref().ok_or(CommandError::NoActiveForm)
    }

    /// Replaces the open dialog, discarding whatever was open before.
    pub(crate) fn open_form(&mut self, kind: FormKind) {
        if let Some(previous) = self.active.take() {
            previous.session.close();
            output::warning(format!("Discarded open form `{}`.", previous.label()));
        }
        let active = ActiveForm::open(kind);
        output::success(format!("Opened form `{}`.", active.label()));
        self.active = Some(active);
    }

    pub(crate) fn close_form(&mut self) -> CommandResult {
        let active = self.active.take().ok_or(CommandError::NoActiveForm)?;
        active.session.close();
        output::info(format!("Closed form `{}`.", active.label()));
        Ok(())
    }

    pub(crate) fn show_form(&self) -> CommandResult {
        let active = self.active_form()?;
        let session = &active.session;
        let record = session.record();
        let errors = session.errors();

        output::section(format!("Form {} ({})", active.label(), session.status()));
        for field in &session.schema().fields {
            let marker = if field.is_required() { "*" } else { " " };
            let value = record.get(field.key).map(ToString::to_string).unwrap_or_default();
            match field.help {
                Some(help) => output::info(format!(
                    "  {marker} {:<16} {:<24} {:<20} ({help})",
                    field.key, field.label, value
                )),
                None => output::info(format!("  {marker} {:<16} {:<24} {}", field.key, field.label, value)),
            }
            if field.is_list() {
                for (index, row) in record.list(field.key).iter().enumerate() {
                    output::info(format!("      row {}: {}", index + 1, row));
                }
            }
        }
        if !errors.is_empty() {
            print_errors(&errors);
        }
        Ok(())
    }

    pub(crate) fn submit_form(&mut self) -> CommandResult {
        let active = self.active_form()?;
        let session = active.session.clone();
        let session = &session;
        let outcome = match &active.kind {
            FormKind::Student(wizard) => {
                describe(self.block_on(self.app.students().submit(session, wizard))?)
            }
            FormKind::Teacher(wizard) => {
                describe(self.block_on(self.app.teachers().submit(session, wizard))?)
            }
            FormKind::Classroom { wizard, api } => {
                describe(self.block_on(api.submit(session, wizard))?)
            }
            FormKind::Schedule(wizard) => {
                describe(self.block_on(self.app.schedules().submit(session, wizard))?)
            }
        };

        match outcome {
            SubmitOutcome::Submitted(label) => {
                output::success(format!("Saved {}.", label));
                self.active = None;
            }
            SubmitOutcome::Invalid => {
                output::warning("The form has errors:");
                print_errors(&session.errors());
            }
            SubmitOutcome::Rejected(message) => {
                output::error(format!("Submission rejected: {}", message));
                output::info("The form is unchanged; fix the problem and `submit` again.");
            }
            SubmitOutcome::InFlight => {
                output::warning("A submission for this form is already in progress.");
            }
        }
        Ok(())
    }

    pub(crate) fn show_config(&self) {
        let config = self.app.config();
        output::section("Configuration");
        output::info(format!("  api_url : {}", config.api_base_url));
        output::info(format!("  timeout : {}s", config.request_timeout_secs));
        output::info(format!(
            "  token   : {}",
            if config.auth_token.is_some() { "set" } else { "not set" }
        ));
        output::info(format!("  file    : {}", self.config_manager.config_path().display()));
    }

    pub(crate) fn set_config_value(&mut self, key: &str, value: &str) -> CommandResult {
        let mut config = self.config_manager.load()?;
        match key.to_lowercase().as_str() {
            "api_url" => {
                if value.is_empty() {
                    return Err(CommandError::InvalidArguments("api_url cannot be empty".into()));
                }
                config.api_base_url = value.to_string();
            }
            "timeout" => {
                let parsed: u64 = value.parse().map_err(|_| {
                    CommandError::InvalidArguments("timeout must be a number of seconds".into())
                })?;
                if parsed == 0 {
                    return Err(CommandError::InvalidArguments(
                        "timeout must be greater than zero".into(),
                    ));
                }
                config.request_timeout_secs = parsed;
            }
            "token" => {
                config.auth_token = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown config key `{}`",
                    other
                )))
            }
        }
        self.config_manager.save(&config)?;
        self.app = build_app(config.with_env_overrides())?;
        output::success("Configuration updated.");
        Ok(())
    }
}

fn build_app(config: Config) -> Result<AppContext, ApiError> {
    let client = HttpApiClient::new(&config)?;
    Ok(AppContext::new(config, Arc::new(client)))
}

fn describe<T: Displayable>(outcome: SubmitOutcome<T>) -> SubmitOutcome<String> {
    match outcome {
        SubmitOutcome::Submitted(value) => SubmitOutcome::Submitted(value.display_label()),
        SubmitOutcome::Invalid => SubmitOutcome::Invalid,
        SubmitOutcome::Rejected(message) => SubmitOutcome::Rejected(message),
        SubmitOutcome::InFlight => SubmitOutcome::InFlight,
    }
}

pub(crate) fn print_errors(errors: &crate::form::ErrorMap) {
    for (field, error) in errors.iter() {
        match error {
            FieldError::Message(message) => output::error(format!("{field}: {message}")),
            FieldError::Entries(rows) => {
                for (index, message) in rows {
                    output::error(format!("{field} row {}: {message}", index + 1));
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No form is open. Use `open <form>` first.")]
    NoActiveForm,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    config_manager: ConfigManager,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_config_manager(CliMode::Script, config_manager)?;
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

    fn scripted(lines: &[&str]) -> ShellContext {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        process_script(manager, lines).unwrap()
    }

    #[test]
    fn open_and_set_fields_updates_session() {
        let context = scripted(&["open teacher", "set name \"Hoa Tran\"", "set experience_years 3"]);
        let active = context.active.as_ref().unwrap();
        let record = active.session.record();
        assert_eq!(record.text("name"), "Hoa Tran");
        assert_eq!(record.number("experience_years"), Some(3.0));
        assert_eq!(active.label(), "teacher:new");
    }

    #[test]
    fn close_discards_active_form() {
        let context = scripted(&["open student", "close"]);
        assert!(context.active.is_none());
    }

    #[test]
    fn submit_with_errors_keeps_form_open() {
        let context = scripted(&["open schedule c-1", "submit"]);
        let active = context.active.as_ref().unwrap();
        assert!(active.session.errors().contains("room"));
        assert!(!active.session.is_closed());
    }

    #[test]
    fn config_set_persists_and_rebuilds_client() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let context =
            process_script(manager.clone(), &["config set api_url https://ecm.example/api"]).unwrap();
        assert_eq!(context.app.config().api_base_url, "https://ecm.example/api");
        assert_eq!(manager.load().unwrap().api_base_url, "https://ecm.example/api");
    }

    #[test]
    fn exit_stops_processing() {
        let context = scripted(&["exit", "open student"]);
        assert!(context.active.is_none());
    }
}
