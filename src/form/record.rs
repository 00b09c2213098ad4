use std::collections::BTreeMap;

use serde::Serialize;

use crate::form::schema::FieldSchema;
use crate::form::value::FieldValue;

/// In-memory values of one entity being created or edited.
///
/// Holds exactly the keys declared by its schema. Only the owning
/// [`FormSession`](crate::form::FormSession) mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormRecord {
    values: BTreeMap<String, FieldValue>,
}

impl FormRecord {
    /// Seeds a record from `initial`, defaulting every declared key it omits.
    /// Keys the schema does not declare are dropped.
    pub fn from_schema(schema: &FieldSchema, mut initial: BTreeMap<String, FieldValue>) -> Self {
        let mut values = BTreeMap::new();
        for field in &schema.fields {
            let value = initial
                .remove(field.key)
                .unwrap_or_else(|| field.default.clone());
            values.insert(field.key.to_string(), value);
        }
        for key in initial.keys() {
            tracing::debug!(form = schema.name, field = %key, "ignoring undeclared initial value");
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Text of `key`, or an empty string when it is absent or not text.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Trimmed text of `key`, `None` when blank.
    pub fn optional_text(&self, key: &str) -> Option<String> {
        let trimmed = self.text(key).trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    pub fn list(&self, key: &str) -> &[FieldValue] {
        self.get(key).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plain JSON object of the current values.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }

    pub(crate) fn set(&mut self, key: &str, value: FieldValue) {
        if let Some(slot) = self.values.get_mut(key) {
            *slot = value;
        }
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.values.get_mut(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::FieldDescriptor;

    fn schema() -> FieldSchema {
        FieldSchema::new(
            "teacher",
            vec![
                FieldDescriptor::text("name", "Name"),
                FieldDescriptor::text("specialization", "Specialization")
                    .with_default("general-english"),
                FieldDescriptor::number("experience_years", "Experience", 0.0),
            ],
        )
    }

    #[test]
    fn record_has_exactly_schema_keys() {
        let mut initial = BTreeMap::new();
        initial.insert("name".to_string(), FieldValue::from("Ann"));
        initial.insert("unexpected".to_string(), FieldValue::from("x"));

        let record = FormRecord::from_schema(&schema(), initial);
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["experience_years", "name", "specialization"]);
        assert_eq!(record.text("name"), "Ann");
        assert_eq!(record.text("specialization"), "general-english");
        assert_eq!(record.number("experience_years"), Some(0.0));
    }

    #[test]
    fn set_ignores_undeclared_keys() {
        let mut record = FormRecord::from_schema(&schema(), BTreeMap::new());
        record.set("bogus", FieldValue::from("x"));
        assert!(record.get("bogus").is_none());
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn optional_text_trims_and_drops_blank() {
        let mut record = FormRecord::from_schema(&schema(), BTreeMap::new());
        assert_eq!(record.optional_text("name"), None);
        record.set("name", FieldValue::from("  Ann  "));
        assert_eq!(record.optional_text("name").as_deref(), Some("Ann"));
    }
}
