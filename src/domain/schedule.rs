use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// One weekly meeting of a classroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    pub start_time: String,
    pub end_time: String,
}

/// Schedule entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub class_id: String,
    pub weekday: Weekday,
    pub start_time: String,
    pub end_time: String,
}

impl Identifiable for Schedule {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Schedule {
    fn display_label(&self) -> String {
        format!("{} {}-{}", self.weekday.label(), self.start_time, self.end_time)
    }
}

/// Payload for adding a weekly meeting to a classroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub class_id: String,
    pub weekday: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    pub teacher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A standard teaching slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: &'static str,
    pub start_time: &'static str,
    pub end_time: &'static str,
}

impl TimeSlot {
    pub fn find(id: &str) -> Option<&'static TimeSlot> {
        TIME_SLOTS.iter().find(|slot| slot.id == id.trim())
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}

pub const TIME_SLOTS: &[TimeSlot] = &[
    TimeSlot { id: "1", start_time: "07:00", end_time: "08:30" },
    TimeSlot { id: "2", start_time: "08:30", end_time: "10:00" },
    TimeSlot { id: "3", start_time: "10:00", end_time: "11:30" },
    TimeSlot { id: "4", start_time: "14:00", end_time: "15:30" },
    TimeSlot { id: "5", start_time: "15:30", end_time: "17:00" },
    TimeSlot { id: "6", start_time: "17:00", end_time: "18:30" },
    TimeSlot { id: "7", start_time: "18:30", end_time: "20:00" },
    TimeSlot { id: "8", start_time: "20:00", end_time: "21:30" },
];
