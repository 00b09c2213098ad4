use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change connection settings",
        "config [show|set <api_url|timeout|token> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        context.show_config();
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <api_url|timeout|token> <value>".into(),
                ));
            }
            let value = args[2..].join(" ");
            context.set_config_value(args[1], value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`",
            other
        ))),
    }
}
