use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{ScheduleCreate, TimeSlot, Weekday, TIME_SLOTS};
use crate::errors::FormError;
use crate::form::{FieldDescriptor, FieldSchema, FieldValue, FormFlow, FormRecord, FormSession, Rule};
use crate::wizards::{one_of, parse_choice, required_text};

/// Dialog adding one weekly meeting to a classroom.
pub struct ScheduleWizard {
    schema: Arc<FieldSchema>,
    class_id: String,
    initial: BTreeMap<String, FieldValue>,
}

impl ScheduleWizard {
    /// `teacher` prefills the teacher field, typically the classroom's teacher.
    pub fn new(class_id: impl Into<String>, teacher: Option<String>) -> Self {
        let first = &TIME_SLOTS[0];
        let fields = vec![
            FieldDescriptor::text("weekday", "Weekday")
                .with_default(Weekday::Monday.as_str())
                .required("Please select a weekday")
                .with_rule(one_of::<Weekday>("Unknown weekday")),
            FieldDescriptor::text("start_time", "Start time")
                .with_default(first.start_time)
                .required("Start time is required")
                .with_rule(Rule::time("Start time must be HH:MM")),
            FieldDescriptor::text("end_time", "End time")
                .with_default(first.end_time)
                .required("End time is required")
                .with_rule(Rule::time("End time must be HH:MM"))
                .with_rule(Rule::time_after("start_time", "End time must be after start time")),
            FieldDescriptor::text("room", "Room").required("Room is required"),
            FieldDescriptor::text("teacher", "Teacher").required("Teacher is required"),
            FieldDescriptor::text("notes", "Notes"),
        ];

        let mut initial = BTreeMap::new();
        initial.insert("teacher".to_string(), FieldValue::from(teacher));

        Self {
            schema: Arc::new(FieldSchema::new("schedule", fields)),
            class_id: class_id.into(),
            initial,
        }
    }

    pub fn class_id(&self) -> &str {
        &self.class_id
    }
}

/// Copies a standard slot's start and end time into `session`.
pub fn apply_time_slot(session: &FormSession, slot: &TimeSlot) -> Result<(), FormError> {
    session.set_field("start_time", slot.start_time)?;
    session.set_field("end_time", slot.end_time)
}

impl FormFlow for ScheduleWizard {
    type Output = ScheduleCreate;

    fn schema(&self) -> Arc<FieldSchema> {
        Arc::clone(&self.schema)
    }

    fn initial_values(&self) -> BTreeMap<String, FieldValue> {
        self.initial.clone()
    }

    fn commit(&self, record: &FormRecord) -> Result<Self::Output, FormError> {
        Ok(ScheduleCreate {
            class_id: self.class_id.clone(),
            weekday: parse_choice(record, "weekday")?,
            start_time: required_text(record, "start_time")?,
            end_time: required_text(record, "end_time")?,
            room: required_text(record, "room")?,
            teacher: required_text(record, "teacher")?,
            notes: record.optional_text("notes"),
        })
    }
}
