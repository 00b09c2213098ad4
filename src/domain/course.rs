use serde::{Deserialize, Serialize};

use crate::domain::common::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub course_name: String,
    #[serde(default)]
    pub level: String,
}

impl Identifiable for Course {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Course {
    fn display_label(&self) -> String {
        format!("{} - {}", self.course_name, self.level)
    }
}
