//! Entity forms for the admin dialogs, built on [`crate::form`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::errors::FormError;
use crate::form::{parse_date, FormRecord, Rule};

mod classroom;
mod schedule;
mod student;
mod teacher;

pub use classroom::{ClassroomSubmission, ClassroomWizard, SCHEDULE_ROW_KEYS};
pub use schedule::{apply_time_slot, ScheduleWizard};
pub use student::{StudentSubmission, StudentWizard};
pub use teacher::TeacherWizard;

/// Non-blank values must parse as `T`.
pub(crate) fn one_of<T>(message: impl Into<String>) -> Rule
where
    T: FromStr + 'static,
{
    Rule::cross_field(
        |value, _| {
            value.is_blank()
                || value
                    .as_text()
                    .map(|text| text.parse::<T>().is_ok())
                    .unwrap_or(false)
        },
        message,
    )
}

/// Non-blank values must be one of the listed option values.
pub(crate) fn listed(options: &'static [(&'static str, &'static str)], message: impl Into<String>) -> Rule {
    Rule::cross_field(
        move |value, _| {
            value.is_blank()
                || value
                    .as_text()
                    .map(|text| options.iter().any(|(option, _)| *option == text.trim()))
                    .unwrap_or(false)
        },
        message,
    )
}

pub(crate) fn required_text(record: &FormRecord, key: &str) -> Result<String, FormError> {
    record
        .optional_text(key)
        .ok_or_else(|| FormError::Commit(format!("`{key}` is empty")))
}

pub(crate) fn required_date(record: &FormRecord, key: &str) -> Result<NaiveDate, FormError> {
    parse_date(record.text(key))
        .ok_or_else(|| FormError::Commit(format!("`{key}` is not a valid date")))
}

pub(crate) fn parse_choice<T>(record: &FormRecord, key: &str) -> Result<T, FormError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    record
        .text(key)
        .parse::<T>()
        .map_err(|err| FormError::Commit(err.to_string()))
}
