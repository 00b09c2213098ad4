use std::sync::Arc;

use crate::domain::{TeacherCreate, MAX_EXPERIENCE_YEARS, QUALIFICATIONS, SPECIALIZATIONS};
use crate::errors::FormError;
use crate::form::{FieldDescriptor, FieldSchema, FormFlow, FormRecord, Rule};
use crate::wizards::{listed, required_text};

/// Registration dialog for new teachers.
pub struct TeacherWizard {
    schema: Arc<FieldSchema>,
}

impl TeacherWizard {
    pub fn new_create() -> Self {
        let fields = vec![
            FieldDescriptor::text("name", "Full name").required("Name is required"),
            FieldDescriptor::text("email", "Email")
                .required("Email is required")
                .with_rule(Rule::email("Email is invalid")),
            FieldDescriptor::text("phone_number", "Phone number")
                .required("Phone number is required")
                .with_rule(Rule::phone("Phone number is invalid")),
            FieldDescriptor::text("specialization", "Specialization")
                .with_default("general-english")
                .required("Specialization is required")
                .with_rule(listed(SPECIALIZATIONS, "Unknown specialization")),
            FieldDescriptor::text("education", "Qualification")
                .with_default("bachelor")
                .with_rule(listed(QUALIFICATIONS, "Unknown qualification")),
            FieldDescriptor::number("experience_years", "Years of experience", 0.0)
                .with_rule(Rule::cross_field(
                    |value, _| match value.as_number() {
                        Some(years) => {
                            years.fract() == 0.0
                                && (0.0..=f64::from(MAX_EXPERIENCE_YEARS)).contains(&years)
                        }
                        None => value.is_blank(),
                    },
                    "Experience must be a whole number of years between 0 and 10",
                )),
            FieldDescriptor::text("bio", "Bio"),
            FieldDescriptor::text("password", "Initial password")
                .with_help("Leave blank to let the server generate one"),
        ];
        Self {
            schema: Arc::new(FieldSchema::new("teacher", fields)),
        }
    }
}

impl Default for TeacherWizard {
    fn default() -> Self {
        Self::new_create()
    }
}

impl FormFlow for TeacherWizard {
    type Output = TeacherCreate;

    fn schema(&self) -> Arc<FieldSchema> {
        Arc::clone(&self.schema)
    }

    fn commit(&self, record: &FormRecord) -> Result<Self::Output, FormError> {
        let experience_years = record.number("experience_years").unwrap_or(0.0);
        Ok(TeacherCreate {
            name: required_text(record, "name")?,
            email: required_text(record, "email")?,
            phone_number: required_text(record, "phone_number")?,
            specialization: required_text(record, "specialization")?,
            education: record
                .optional_text("education")
                .unwrap_or_else(|| "bachelor".to_string()),
            experience_years: experience_years.max(0.0) as u32,
            bio: record.optional_text("bio"),
            password: record.optional_text("password"),
        })
    }
}
