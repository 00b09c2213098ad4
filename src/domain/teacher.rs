use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Teaching specializations offered by the center, as `(value, label)`.
pub const SPECIALIZATIONS: &[(&str, &str)] = &[
    ("general-english", "General English"),
    ("business-english", "Business English"),
    ("academic-english", "Academic English"),
    ("conversation", "Conversational English"),
    ("ielts", "IELTS"),
    ("toeic", "TOEIC"),
    ("toefl", "TOEFL"),
    ("young-learners", "English for Young Learners"),
    ("grammar", "Grammar"),
    ("pronunciation", "Pronunciation"),
];

/// Teaching qualifications, as `(value, label)`.
pub const QUALIFICATIONS: &[(&str, &str)] = &[
    ("bachelor", "Bachelor"),
    ("master", "Master"),
    ("phd", "PhD"),
    ("tesol", "TESOL"),
    ("tefl", "TEFL"),
    ("celta", "CELTA"),
    ("delta", "DELTA"),
    ("other", "Other"),
];

/// Years-of-experience choices top out here ("10+ years").
pub const MAX_EXPERIENCE_YEARS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Identifiable for Teacher {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Teacher {
    fn display_label(&self) -> String {
        format!("{} - {}", self.name, self.specialization)
    }
}

/// Payload for registering a new teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherCreate {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub specialization: String,
    pub education: String,
    pub experience_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
