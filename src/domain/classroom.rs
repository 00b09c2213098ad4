use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::domain::schedule::ScheduleSlot;

/// Minimal teacher reference embedded in classroom responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Classroom record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: String,
    pub class_name: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub teacher: Option<TeacherRef>,
    #[serde(default = "default_classroom_status")]
    pub status: ClassroomStatus,
    /// Date or ISO timestamp, as the backend sends it.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub current_students: u32,
    #[serde(default)]
    pub max_students: Option<u32>,
    #[serde(default)]
    pub schedules: Vec<ScheduleSlot>,
}

fn default_classroom_status() -> ClassroomStatus {
    ClassroomStatus::Active
}

impl Classroom {
    pub fn teacher_name(&self) -> Option<&str> {
        self.teacher.as_ref().map(|teacher| teacher.name.as_str())
    }
}

impl Identifiable for Classroom {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Classroom {
    fn display_label(&self) -> String {
        match self.max_students {
            Some(max) => format!("{} ({}/{})", self.class_name, self.current_students, max),
            None => format!("{} ({})", self.class_name, self.current_students),
        }
    }
}

/// Payload for updating a classroom. Fields left `None` are not sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassroomUpdate {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub teacher_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClassroomStatus>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedules: Option<Vec<ScheduleSlot>>,
}
