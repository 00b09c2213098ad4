//! Shell vocabulary, grouped by what the commands act on.

pub mod config;
pub mod data;
pub mod form;
pub mod system;

pub(crate) use data::LIST_RESOURCES;
pub(crate) use form::FORM_NAMES;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Section a command is listed under in `help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Forms,
    Records,
    Settings,
    Shell,
}

impl CommandGroup {
    pub const ALL: [CommandGroup; 4] = [
        CommandGroup::Forms,
        CommandGroup::Records,
        CommandGroup::Settings,
        CommandGroup::Shell,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Forms => "Forms",
            CommandGroup::Records => "Records",
            CommandGroup::Settings => "Settings",
            CommandGroup::Shell => "Shell",
        }
    }
}

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub group: CommandGroup,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            group: CommandGroup::Shell,
            handler,
        }
    }

    /// Argument part of the usage line, e.g. `<field> <value>` for `set`.
    pub fn arguments(&self) -> &'static str {
        self.usage
            .strip_prefix(self.name)
            .map(str::trim_start)
            .unwrap_or("")
    }
}

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let groups = [
        (CommandGroup::Forms, form::definitions()),
        (CommandGroup::Records, data::definitions()),
        (CommandGroup::Settings, config::definitions()),
        (CommandGroup::Shell, system::definitions()),
    ];
    groups
        .into_iter()
        .flat_map(|(group, definitions)| {
            definitions
                .into_iter()
                .map(move |definition| CommandDefinition { group, ..definition })
        })
        .collect()
}

/// Commands in registration order, looked up by lowercase name.
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<CommandDefinition>) -> Self {
        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.iter()
    }

    pub fn in_group(&self, group: CommandGroup) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.iter().filter(move |command| command.group == group)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|command| command.name)
    }
}
