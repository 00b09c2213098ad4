use crate::cli::commands::CommandDefinition;
use crate::cli::core::{print_errors, CommandError, CommandResult, FormKind, ShellContext};
use crate::cli::output;
use crate::api::ClassroomApi;
use crate::domain::{TimeSlot, TIME_SLOTS};
use crate::form::FieldValue;
use crate::wizards::{apply_time_slot, ClassroomWizard, ScheduleWizard, StudentWizard, TeacherWizard};

/// Names accepted by `open`.
pub(crate) const FORM_NAMES: &[&str] = &["student", "teacher", "classroom", "schedule"];

const FORMS: &[(&str, &str)] = &[
    ("student [id]", "Register a student, or edit one by id"),
    ("teacher", "Register a teacher"),
    ("classroom <id> [admin|staff]", "Edit a classroom (staff view by default)"),
    ("schedule <class_id> [teacher]", "Add a weekly meeting to a classroom"),
];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("forms", "List the forms that can be opened", "forms", cmd_forms),
        CommandDefinition::new("open", "Open a form", "open <form> [args]", cmd_open),
        CommandDefinition::new("set", "Set a field of the open form", "set <field> <value>", cmd_set),
        CommandDefinition::new(
            "row",
            "Edit rows of a list field",
            "row add <field> | row set <field> <n> <key> <value> | row remove <field> <n>",
            cmd_row,
        ),
        CommandDefinition::new(
            "slot",
            "List standard time slots or apply one to the schedule form",
            "slot [id]",
            cmd_slot,
        ),
        CommandDefinition::new("show", "Show the open form", "show", cmd_show),
        CommandDefinition::new("validate", "Validate the open form", "validate", cmd_validate),
        CommandDefinition::new("submit", "Validate and submit the open form", "submit", cmd_submit),
        CommandDefinition::new("reset", "Restore the form's initial values", "reset", cmd_reset),
        CommandDefinition::new("close", "Close the open form", "close", cmd_close),
    ]
}

fn cmd_forms(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Forms");
    for (usage, description) in FORMS {
        output::info(format!("  {:<30} {}", usage, description));
    }
    Ok(())
}

fn cmd_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(form) = args.first() else {
        return Err(CommandError::InvalidArguments(format!(
            "usage: open <{}> [args]",
            FORM_NAMES.join("|")
        )));
    };

    let kind = match form.to_lowercase().as_str() {
        "student" => match args.get(1) {
            None => FormKind::Student(StudentWizard::new_create()),
            Some(id) => {
                let students = context.block_on(context.app.students().list())?;
                let student = students
                    .iter()
                    .find(|student| student.id == *id)
                    .ok_or_else(|| CommandError::InvalidArguments(format!("no student with id `{}`", id)))?;
                FormKind::Student(StudentWizard::new_edit(student))
            }
        },
        "teacher" => FormKind::Teacher(TeacherWizard::new_create()),
        "classroom" => {
            let id = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: open classroom <id> [admin|staff]".into())
            })?;
            let client = context.app.client();
            let admin = matches!(args.get(2), Some(scope) if scope.eq_ignore_ascii_case("admin"));
            let api = if admin {
                ClassroomApi::admin(client)
            } else {
                ClassroomApi::staff(client)
            };
            let classroom = context.block_on(api.get(id))?;
            let wizard = if admin {
                ClassroomWizard::admin(&classroom)
            } else {
                ClassroomWizard::staff(&classroom)
            };
            FormKind::Classroom { wizard, api }
        }
        "schedule" => {
            let class_id = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: open schedule <class_id> [teacher]".into())
            })?;
            let teacher = if args.len() > 2 {
                Some(args[2..].join(" "))
            } else {
                None
            };
            FormKind::Schedule(ScheduleWizard::new(*class_id, teacher))
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown form `{}`; see `forms`",
                other
            )))
        }
    };

    context.open_form(kind);
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("usage: set <field> <value>".into()));
    }
    let active = context.active_form()?;
    let name = args[0];
    let value = args[1..].join(" ");

    let value = match active.session.schema().descriptor(name) {
        Some(field) if field.is_list() => {
            return Err(CommandError::InvalidArguments(format!(
                "`{}` is a list; use `row` to edit it",
                name
            )))
        }
        Some(field) if field.is_number() => match value.trim().parse::<f64>() {
            Ok(number) => FieldValue::Number(number),
            Err(_) => FieldValue::from(value),
        },
        _ => FieldValue::from(value),
    };
    active.session.set_field(name, value)?;
    Ok(())
}

fn parse_row_number(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "row number must be 1 or greater, got `{}`",
            raw
        ))),
    }
}

fn cmd_row(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let active = context.active_form()?;
    let session = &active.session;
    match args {
        ["add", field] => {
            let keys = session
                .schema()
                .descriptor(field)
                .map(|descriptor| descriptor.row_keys())
                .unwrap_or_default();
            let index = session.add_entry(field, FieldValue::blank_group(&keys))?;
            output::info(format!("Added row {} to `{}`.", index + 1, field));
            Ok(())
        }
        ["set", field, row, key, value @ ..] if !value.is_empty() => {
            let index = parse_row_number(row)?;
            session.set_entry_field(field, index, key, value.join(" "))?;
            Ok(())
        }
        ["remove", field, row] => {
            let index = parse_row_number(row)?;
            session.remove_entry(field, index)?;
            output::info(format!("Removed row {} from `{}`.", index + 1, field));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: row add <field> | row set <field> <n> <key> <value> | row remove <field> <n>"
                .into(),
        )),
    }
}

fn cmd_slot(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(id) = args.first() else {
        output::section("Time slots");
        for slot in TIME_SLOTS {
            output::info(format!("  {}  {}", slot.id, slot.label()));
        }
        return Ok(());
    };

    let active = context.active_form()?;
    if !matches!(active.kind, FormKind::Schedule(_)) {
        return Err(CommandError::InvalidArguments(
            "time slots apply to the schedule form only".into(),
        ));
    }
    let slot = TimeSlot::find(id)
        .ok_or_else(|| CommandError::InvalidArguments(format!("unknown time slot `{}`", id)))?;
    apply_time_slot(&active.session, slot)?;
    output::info(format!("Time set to {}.", slot.label()));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.show_form()
}

fn cmd_validate(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let active = context.active_form()?;
    if active.session.validate() {
        output::success("All fields are valid.");
    } else {
        output::warning("The form has errors:");
        print_errors(&active.session.errors());
    }
    Ok(())
}

fn cmd_submit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.submit_form()
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.active_form()?.session.reset()?;
    output::info("Form reset to its initial values.");
    Ok(())
}

fn cmd_close(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.close_form()
}
