use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Student record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default = "default_input_level")]
    pub input_level: InputLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_phone: String,
    #[serde(default = "default_student_status")]
    pub status: StudentStatus,
}

fn default_input_level() -> InputLevel {
    InputLevel::Beginner
}

fn default_student_status() -> StudentStatus {
    StudentStatus::Active
}

impl Identifiable for Student {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Student {
    fn display_label(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// Payload for registering a new student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentCreate {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub input_level: InputLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub parent_name: String,
    pub parent_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Payload for updating an existing student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub input_level: InputLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub parent_name: String,
    pub parent_phone: String,
    pub status: StudentStatus,
}

/// Students whose name, email or id contains `term`, ignoring case.
pub fn search_students<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let needle = term.trim().to_lowercase();
    students
        .iter()
        .filter(|student| {
            needle.is_empty()
                || student.name.to_lowercase().contains(&needle)
                || student.email.to_lowercase().contains(&needle)
                || student.id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Head counts shown above the student roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub suspended: usize,
}

impl RosterSummary {
    pub fn from_students(students: &[Student]) -> Self {
        students.iter().fold(Self::default(), |mut summary, student| {
            summary.total += 1;
            match student.status {
                StudentStatus::Active => summary.active += 1,
                StudentStatus::Inactive => summary.inactive += 1,
                StudentStatus::Suspended => summary.suspended += 1,
            }
            summary
        })
    }
}
