use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{date_part, Classroom, ClassroomStatus, ClassroomUpdate, ScheduleSlot, Weekday};
use crate::errors::FormError;
use crate::form::{
    parse_time, FieldDescriptor, FieldSchema, FieldValue, FormFlow, FormRecord, Rule, SessionMode,
};
use crate::wizards::{one_of, parse_choice, required_date, required_text};

/// Members of one row of the `schedules` list.
pub const SCHEDULE_ROW_KEYS: [&str; 3] = ["weekday", "start_time", "end_time"];

/// Typed result of a classroom edit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassroomSubmission {
    pub id: String,
    pub changes: ClassroomUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Admin,
    Staff,
}

/// Edit dialog for an existing classroom. Admins manage the course and
/// teacher assignment; staff also manage the room, status and weekly schedule.
pub struct ClassroomWizard {
    schema: Arc<FieldSchema>,
    audience: Audience,
    id: String,
    initial: BTreeMap<String, FieldValue>,
}

impl ClassroomWizard {
    pub fn admin(classroom: &Classroom) -> Self {
        let fields = vec![
            FieldDescriptor::text("class_name", "Class name").required("Class name is required"),
            FieldDescriptor::text("course_id", "Course").required("Please select a course"),
            FieldDescriptor::text("teacher_id", "Teacher").required("Please select a teacher"),
            start_date(),
            end_date(),
        ];
        Self::build(Audience::Admin, FieldSchema::new("classroom", fields), classroom)
    }

    pub fn staff(classroom: &Classroom) -> Self {
        let fields = vec![
            FieldDescriptor::text("class_name", "Class name").required("Class name is required"),
            FieldDescriptor::text("course_id", "Course"),
            FieldDescriptor::text("teacher_id", "Teacher").required("Please select a teacher"),
            start_date(),
            end_date(),
            FieldDescriptor::text("room", "Room").required("Room is required"),
            FieldDescriptor::text("status", "Status")
                .with_default(ClassroomStatus::Active.as_str())
                .required("Please select a status")
                .with_rule(one_of::<ClassroomStatus>("Unknown classroom status")),
            FieldDescriptor::list("schedules", "Weekly schedule")
                .with_default(vec![FieldValue::blank_group(&SCHEDULE_ROW_KEYS)])
                .with_rule(
                    Rule::each_entry(
                        &SCHEDULE_ROW_KEYS,
                        "Fill in the weekday, start time and end time",
                    )
                    .with_row_check(check_schedule_row),
                ),
        ];
        Self::build(Audience::Staff, FieldSchema::new("classroom", fields), classroom)
    }

    fn build(audience: Audience, schema: FieldSchema, classroom: &Classroom) -> Self {
        let mut initial = BTreeMap::new();
        initial.insert("class_name".into(), FieldValue::from(&classroom.class_name));
        initial.insert("course_id".into(), FieldValue::from(classroom.course_id.clone()));
        initial.insert("teacher_id".into(), FieldValue::from(classroom.teacher_id.clone()));
        if let Some(start) = &classroom.start_date {
            initial.insert("start_date".into(), FieldValue::from(date_part(start)));
        }
        if let Some(end) = &classroom.end_date {
            initial.insert("end_date".into(), FieldValue::from(date_part(end)));
        }
        if audience == Audience::Staff {
            initial.insert("room".into(), FieldValue::from(classroom.room.clone()));
            initial.insert("status".into(), FieldValue::from(classroom.status.as_str()));
            if !classroom.schedules.is_empty() {
                let rows = classroom.schedules.iter().map(schedule_row).collect::<Vec<_>>();
                initial.insert("schedules".into(), FieldValue::List(rows));
            }
        }

        Self {
            schema: Arc::new(schema),
            audience,
            id: classroom.id.clone(),
            initial,
        }
    }
}

fn start_date() -> FieldDescriptor {
    FieldDescriptor::text("start_date", "Start date")
        .required("Start date is required")
        .with_rule(Rule::date("Start date must be YYYY-MM-DD"))
}

fn end_date() -> FieldDescriptor {
    FieldDescriptor::text("end_date", "End date")
        .required("End date is required")
        .with_rule(Rule::date("End date must be YYYY-MM-DD"))
        .with_rule(Rule::date_after("start_date", "End date must be after start date"))
}

fn schedule_row(slot: &ScheduleSlot) -> FieldValue {
    FieldValue::group([
        ("weekday", slot.weekday.as_str()),
        ("start_time", slot.start_time.as_str()),
        ("end_time", slot.end_time.as_str()),
    ])
}

/// Weekday must be known, both times `HH:MM`, and the end after the start.
fn check_schedule_row(row: &FieldValue) -> Result<(), String> {
    row.member_text("weekday")
        .parse::<Weekday>()
        .map_err(|_| "Unknown weekday".to_string())?;
    let start = parse_time(row.member_text("start_time"));
    let end = parse_time(row.member_text("end_time"));
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(()),
        (Some(_), Some(_)) => Err("End time must be after start time".into()),
        _ => Err("Times must be HH:MM".into()),
    }
}

fn parse_schedules(record: &FormRecord) -> Result<Vec<ScheduleSlot>, FormError> {
    record
        .list("schedules")
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let weekday = row.member_text("weekday").parse::<Weekday>().map_err(|err| {
                FormError::Commit(format!("schedule row {}: {}", index + 1, err))
            })?;
            Ok(ScheduleSlot {
                weekday,
                start_time: row.member_text("start_time").trim().to_string(),
                end_time: row.member_text("end_time").trim().to_string(),
            })
        })
        .collect()
}

impl FormFlow for ClassroomWizard {
    type Output = ClassroomSubmission;

    fn schema(&self) -> Arc<FieldSchema> {
        Arc::clone(&self.schema)
    }

    fn mode(&self) -> SessionMode {
        SessionMode::edit(self.id.clone())
    }

    fn initial_values(&self) -> BTreeMap<String, FieldValue> {
        self.initial.clone()
    }

    fn commit(&self, record: &FormRecord) -> Result<Self::Output, FormError> {
        let mut changes = ClassroomUpdate {
            class_name: required_text(record, "class_name")?,
            course_id: record.optional_text("course_id"),
            teacher_id: required_text(record, "teacher_id")?,
            status: None,
            start_date: required_date(record, "start_date")?,
            end_date: required_date(record, "end_date")?,
            room: None,
            schedules: None,
        };
        if self.audience == Audience::Staff {
            changes.room = Some(required_text(record, "room")?);
            changes.status = Some(parse_choice(record, "status")?);
            changes.schedules = Some(parse_schedules(record)?);
        }
        Ok(ClassroomSubmission {
            id: self.id.clone(),
            changes,
        })
    }
}
