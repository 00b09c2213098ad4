use crate::cli::commands::{CommandDefinition, CommandGroup, CommandRegistry};
use crate::cli::output;

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for group in CommandGroup::ALL {
        output::info(format!("{}:", group.title()));
        for entry in registry.in_group(group) {
            output::info(format!("  {:<10} {}", entry.name, entry.description));
        }
    }
    output::info("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandDefinition) {
    output::section(format!("Help: {}", entry.name));
    output::info(format!("  Description: {}", entry.description));
    output::info(format!("  Usage: {}", entry.usage));
}
