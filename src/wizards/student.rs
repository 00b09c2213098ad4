use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{InputLevel, Student, StudentCreate, StudentStatus, StudentUpdate};
use crate::errors::FormError;
use crate::form::{FieldDescriptor, FieldSchema, FieldValue, FormFlow, FormRecord, Rule, SessionMode};
use crate::wizards::{one_of, parse_choice, required_date, required_text};

/// Typed result of a student dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentSubmission {
    Create(StudentCreate),
    Update { id: String, changes: StudentUpdate },
}

/// Create/edit dialog for students.
pub struct StudentWizard {
    schema: Arc<FieldSchema>,
    mode: SessionMode,
    initial: BTreeMap<String, FieldValue>,
}

impl StudentWizard {
    pub fn new_create() -> Self {
        Self {
            schema: Arc::new(build_schema(false)),
            mode: SessionMode::Create,
            initial: BTreeMap::new(),
        }
    }

    pub fn new_edit(student: &Student) -> Self {
        let mut initial = BTreeMap::new();
        initial.insert("name".into(), FieldValue::from(&student.name));
        initial.insert("email".into(), FieldValue::from(&student.email));
        initial.insert("phone_number".into(), FieldValue::from(&student.phone_number));
        if let Some(date) = &student.date_of_birth {
            initial.insert(
                "date_of_birth".into(),
                FieldValue::from(crate::domain::date_part(date)),
            );
        }
        initial.insert("input_level".into(), FieldValue::from(student.input_level.as_str()));
        initial.insert("bio".into(), FieldValue::from(student.bio.clone()));
        initial.insert("parent_name".into(), FieldValue::from(&student.parent_name));
        initial.insert("parent_phone".into(), FieldValue::from(&student.parent_phone));
        initial.insert("status".into(), FieldValue::from(student.status.as_str()));

        Self {
            schema: Arc::new(build_schema(true)),
            mode: SessionMode::edit(student.id.clone()),
            initial,
        }
    }
}

fn build_schema(editing: bool) -> FieldSchema {
    let mut fields = vec![
        FieldDescriptor::text("name", "Full name").required("Name is required"),
        FieldDescriptor::text("email", "Email")
            .required("Email is required")
            .with_rule(Rule::email("Email is invalid")),
        FieldDescriptor::text("phone_number", "Phone number")
            .required("Phone number is required")
            .with_rule(Rule::phone("Phone number is invalid")),
        FieldDescriptor::text("date_of_birth", "Date of birth")
            .required("Date of birth is required")
            .with_rule(Rule::date("Date of birth must be YYYY-MM-DD"))
            .with_help("YYYY-MM-DD"),
        FieldDescriptor::text("input_level", "Input level")
            .with_default(InputLevel::Beginner.as_str())
            .required("Please select an input level")
            .with_rule(one_of::<InputLevel>("Unknown input level")),
        FieldDescriptor::text("bio", "Notes"),
        FieldDescriptor::text("parent_name", "Parent name").required("Parent name is required"),
        FieldDescriptor::text("parent_phone", "Parent phone")
            .required("Parent phone is required")
            .with_rule(Rule::phone("Parent phone is invalid")),
    ];
    if editing {
        fields.push(
            FieldDescriptor::text("status", "Status")
                .with_default(StudentStatus::Active.as_str())
                .required("Please select a status")
                .with_rule(one_of::<StudentStatus>("Unknown student status")),
        );
    } else {
        fields.push(
            FieldDescriptor::text("password", "Initial password")
                .with_help("Leave blank to let the server generate one"),
        );
    }
    FieldSchema::new("student", fields)
}

impl FormFlow for StudentWizard {
    type Output = StudentSubmission;

    fn schema(&self) -> Arc<FieldSchema> {
        Arc::clone(&self.schema)
    }

    fn mode(&self) -> SessionMode {
        self.mode.clone()
    }

    fn initial_values(&self) -> BTreeMap<String, FieldValue> {
        self.initial.clone()
    }

    fn commit(&self, record: &FormRecord) -> Result<Self::Output, FormError> {
        let name = required_text(record, "name")?;
        let email = required_text(record, "email")?;
        let phone_number = required_text(record, "phone_number")?;
        let date_of_birth = required_date(record, "date_of_birth")?;
        let input_level: InputLevel = parse_choice(record, "input_level")?;
        let bio = record.optional_text("bio");
        let parent_name = required_text(record, "parent_name")?;
        let parent_phone = required_text(record, "parent_phone")?;

        match &self.mode {
            SessionMode::Create => Ok(StudentSubmission::Create(StudentCreate {
                name,
                email,
                phone_number,
                date_of_birth,
                input_level,
                bio,
                parent_name,
                parent_phone,
                password: record.optional_text("password"),
            })),
            SessionMode::Edit { id } => Ok(StudentSubmission::Update {
                id: id.clone(),
                changes: StudentUpdate {
                    name,
                    email,
                    phone_number,
                    date_of_birth,
                    input_level,
                    bio,
                    parent_name,
                    parent_phone,
                    status: parse_choice(record, "status")?,
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fill(session: &crate::form::FormSession) {
        session.set_field("name", "Lan Pham").unwrap();
        session.set_field("email", "lan@example.com").unwrap();
        session.set_field("phone_number", "0901234567").unwrap();
        session.set_field("date_of_birth", "2010-04-12").unwrap();
        session.set_field("parent_name", "Minh Pham").unwrap();
        session.set_field("parent_phone", "0912 345 678").unwrap();
    }

    #[test]
    fn create_schema_has_password_but_no_status() {
        let wizard = StudentWizard::new_create();
        let schema = wizard.schema();
        assert!(schema.contains("password"));
        assert!(!schema.contains("status"));
        assert_eq!(wizard.open_session().record().text("input_level"), "beginner");
    }

    #[test]
    fn create_commit_builds_payload() {
        let wizard = StudentWizard::new_create();
        let session = wizard.open_session();
        fill(&session);
        assert!(session.validate());

        match wizard.commit(&session.record()).unwrap() {
            StudentSubmission::Create(payload) => {
                assert_eq!(payload.name, "Lan Pham");
                assert_eq!(payload.date_of_birth, NaiveDate::from_ymd_opt(2010, 4, 12).unwrap());
                assert_eq!(payload.input_level, InputLevel::Beginner);
                assert_eq!(payload.password, None);
            }
            other => panic!("Unexpected submission: {:?}", other),
        }
    }

    #[test]
    fn edit_seeds_from_student_and_cuts_timestamp() {
        let student = Student {
            id: "st-7".into(),
            name: "Lan Pham".into(),
            email: "lan@example.com".into(),
            phone_number: "0901234567".into(),
            date_of_birth: Some("2010-04-12T00:00:00".into()),
            input_level: InputLevel::Intermediate,
            bio: None,
            parent_name: "Minh Pham".into(),
            parent_phone: "0912345678".into(),
            status: StudentStatus::Suspended,
        };
        let wizard = StudentWizard::new_edit(&student);
        let session = wizard.open_session();
        assert_eq!(session.mode(), &SessionMode::edit("st-7"));
        assert_eq!(session.record().text("date_of_birth"), "2010-04-12");

        session.set_field("status", "active").unwrap();
        match wizard.commit(&session.record()).unwrap() {
            StudentSubmission::Update { id, changes } => {
                assert_eq!(id, "st-7");
                assert_eq!(changes.status, StudentStatus::Active);
                assert_eq!(changes.input_level, InputLevel::Intermediate);
            }
            other => panic!("Unexpected submission: {:?}", other),
        }
    }

    #[test]
    fn invalid_contact_details_are_reported() {
        let session = StudentWizard::new_create().open_session();
        fill(&session);
        session.set_field("email", "lan@example").unwrap();
        session.set_field("parent_phone", "12345").unwrap();
        session.set_field("input_level", "expert").unwrap();
        assert!(!session.validate());
        let errors = session.errors();
        assert_eq!(errors.message("email"), Some("Email is invalid"));
        assert_eq!(errors.message("parent_phone"), Some("Parent phone is invalid"));
        assert_eq!(errors.message("input_level"), Some("Unknown input level"));
    }

    #[test]
    fn blank_input_level_is_a_field_error() {
        let session = StudentWizard::new_create().open_session();
        fill(&session);
        session.set_field("input_level", "  ").unwrap();
        assert!(!session.validate());
        assert_eq!(
            session.errors().message("input_level"),
            Some("Please select an input level")
        );
    }
}
