use std::collections::BTreeMap;

use serde::Serialize;

use crate::form::record::FormRecord;
use crate::form::schema::{FieldSchema, RuleOutcome};

/// Validation failure attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldError {
    /// Single message for the whole field.
    Message(String),
    /// Per-row messages for a list field, keyed by row index.
    Entries(BTreeMap<usize, String>),
}

/// Current validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap {
    fields: BTreeMap<String, FieldError>,
}

impl ErrorMap {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.fields.get(field)
    }

    /// Field-level message, if the field failed as a whole.
    pub fn message(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldError::Message(message)) => Some(message),
            _ => None,
        }
    }

    /// Message for one row of a list field.
    pub fn entry_error(&self, field: &str, index: usize) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldError::Entries(rows)) => rows.get(&index).map(String::as_str),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields.iter().map(|(key, error)| (key.as_str(), error))
    }

    pub(crate) fn insert(&mut self, field: &str, error: FieldError) {
        self.fields.insert(field.to_string(), error);
    }

    /// Drops any error on `field`. Returns whether one was present.
    pub(crate) fn clear(&mut self, field: &str) -> bool {
        self.fields.remove(field).is_some()
    }

    /// Drops the error of one row, leaving other rows untouched.
    pub(crate) fn clear_entry(&mut self, field: &str, index: usize) -> bool {
        let Some(FieldError::Entries(rows)) = self.fields.get_mut(field) else {
            return false;
        };
        let removed = rows.remove(&index).is_some();
        if rows.is_empty() {
            self.fields.remove(field);
        }
        removed
    }

    /// Removes row `index` and shifts the errors of later rows down by one.
    pub(crate) fn remove_entry(&mut self, field: &str, index: usize) {
        let Some(FieldError::Entries(rows)) = self.fields.get_mut(field) else {
            return;
        };
        let shifted: BTreeMap<usize, String> = std::mem::take(rows)
            .into_iter()
            .filter(|(row, _)| *row != index)
            .map(|(row, message)| if row > index { (row - 1, message) } else { (row, message) })
            .collect();
        if shifted.is_empty() {
            self.fields.remove(field);
        } else {
            *rows = shifted;
        }
    }
}

/// Runs every rule of `schema` against `record`.
///
/// Rules of a field run in declaration order; the first failure is the one
/// reported for that field.
pub fn validate_record(schema: &FieldSchema, record: &FormRecord) -> ErrorMap {
    let mut errors = ErrorMap::default();
    for field in &schema.fields {
        let Some(value) = record.get(field.key) else {
            continue;
        };
        for rule in &field.rules {
            match rule.check(value, record) {
                RuleOutcome::Pass => continue,
                RuleOutcome::Message(message) => {
                    errors.insert(field.key, FieldError::Message(message));
                }
                RuleOutcome::Entries(rows) => {
                    errors.insert(field.key, FieldError::Entries(rows));
                }
            }
            break;
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::{FieldDescriptor, Rule};
    use crate::form::value::FieldValue;

    fn contact_schema() -> FieldSchema {
        FieldSchema::new(
            "contact",
            vec![
                FieldDescriptor::text("name", "Name").required("Name is required"),
                FieldDescriptor::text("email", "Email")
                    .required("Email is required")
                    .with_rule(Rule::email("Email is invalid")),
            ],
        )
    }

    fn record(pairs: &[(&str, &str)]) -> FormRecord {
        let initial = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), FieldValue::from(*value)))
            .collect();
        FormRecord::from_schema(&contact_schema(), initial)
    }

    #[test]
    fn first_failing_rule_wins() {
        let errors = validate_record(&contact_schema(), &record(&[]));
        assert_eq!(errors.message("email"), Some("Email is required"));
        assert_eq!(errors.message("name"), Some("Name is required"));

        let errors = validate_record(&contact_schema(), &record(&[("email", "nope")]));
        assert_eq!(errors.message("email"), Some("Email is invalid"));
    }

    #[test]
    fn valid_record_produces_empty_map() {
        let errors = validate_record(
            &contact_schema(),
            &record(&[("name", "Ann"), ("email", "ann@example.com")]),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn remove_entry_shifts_later_rows() {
        let mut errors = ErrorMap::default();
        let rows: BTreeMap<usize, String> =
            [(0, "a".to_string()), (2, "c".to_string()), (3, "d".to_string())]
                .into_iter()
                .collect();
        errors.insert("schedules", FieldError::Entries(rows));

        errors.remove_entry("schedules", 2);
        assert_eq!(errors.entry_error("schedules", 0), Some("a"));
        assert_eq!(errors.entry_error("schedules", 1), None);
        assert_eq!(errors.entry_error("schedules", 2), Some("d"));
    }

    #[test]
    fn clearing_last_entry_drops_field() {
        let mut errors = ErrorMap::default();
        errors.insert(
            "schedules",
            FieldError::Entries([(1, "missing".to_string())].into_iter().collect()),
        );
        assert!(errors.clear_entry("schedules", 1));
        assert!(errors.is_empty());
    }
}
