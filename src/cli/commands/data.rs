use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::domain::{search_students, Displayable, Identifiable, RosterSummary};

/// Resources accepted by `list`.
pub(crate) const LIST_RESOURCES: &[&str] = &["students", "teachers", "courses", "classrooms"];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "list",
            "List records from the backend",
            "list <students|teachers|courses|classrooms> [search]",
            cmd_list,
        ),
        CommandDefinition::new("dashboard", "Show dashboard figures", "dashboard", cmd_dashboard),
    ]
}

fn print_rows<T: Identifiable + Displayable>(title: &str, rows: &[&T]) {
    output::section(title);
    if rows.is_empty() {
        output::info("  (none)");
    }
    for row in rows {
        output::info(format!("  {:<12} {}", row.id(), row.display_label()));
    }
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(resource) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: list <students|teachers|courses|classrooms> [search]".into(),
        ));
    };

    match resource.to_lowercase().as_str() {
        "students" => {
            let students = context.block_on(context.app.students().list())?;
            let term = args[1..].join(" ");
            let matches = search_students(&students, &term);
            print_rows("Students", &matches);
            let summary = RosterSummary::from_students(&students);
            output::info(format!(
                "{} total, {} active, {} inactive, {} suspended",
                summary.total, summary.active, summary.inactive, summary.suspended
            ));
        }
        "teachers" => {
            let teachers = context.block_on(context.app.teachers().list())?;
            print_rows("Teachers", &teachers.iter().collect::<Vec<_>>());
        }
        "courses" => {
            let courses = context.block_on(context.app.courses().list())?;
            print_rows("Courses", &courses.iter().collect::<Vec<_>>());
        }
        "classrooms" => {
            let classrooms = context.block_on(context.app.classrooms().list())?;
            print_rows("Classrooms", &classrooms.iter().collect::<Vec<_>>());
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown resource `{}`",
                other
            )))
        }
    }
    Ok(())
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let dashboard = context.app.dashboard();
    let stats = context.block_on(dashboard.stats())?;
    output::section("Dashboard");
    output::info(format!("  Students          : {}", stats.total_students));
    output::info(format!("  Teachers          : {}", stats.total_teachers));
    output::info(format!(
        "  Classrooms        : {} ({} active)",
        stats.total_classrooms, stats.active_classrooms
    ));
    for card in context.block_on(dashboard.stat_cards())? {
        match card.change {
            Some(change) => output::info(format!("  {:<18}: {} ({})", card.title, card.value, change)),
            None => output::info(format!("  {:<18}: {}", card.title, card.value)),
        }
    }
    Ok(())
}
