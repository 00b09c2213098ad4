use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Value held by one form field.
///
/// Composite inputs (a schedule's weekday/start/end triple) use [`FieldValue::Group`];
/// repeatable rows such as a classroom's weekly schedule use [`FieldValue::List`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<FieldValue>),
    Group(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn empty_text() -> Self {
        FieldValue::Text(String::new())
    }

    /// Builds a group from `(key, value)` pairs.
    pub fn group<K, V, I>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        FieldValue::Group(
            members
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a group whose members are all empty text.
    pub fn blank_group(keys: &[&str]) -> Self {
        Self::group(keys.iter().map(|key| (*key, String::new())))
    }

    /// Whether the value counts as "not filled in".
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Group(members) => members.values().all(FieldValue::is_blank),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Group(members) => Some(members),
            _ => None,
        }
    }

    /// Text of a group member, empty when absent.
    pub fn member_text(&self, key: &str) -> &str {
        self.as_group()
            .and_then(|members| members.get(key))
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty_text()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        FieldValue::Text(value.unwrap_or_default())
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::List(items) => write!(f, "[{} rows]", items.len()),
            FieldValue::Group(members) => {
                let parts: Vec<String> = members
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_text_is_blank() {
        assert!(FieldValue::from("   ").is_blank());
        assert!(!FieldValue::from(" Ann ").is_blank());
    }

    #[test]
    fn numbers_are_never_blank() {
        assert!(!FieldValue::Number(0.0).is_blank());
    }

    #[test]
    fn group_is_blank_only_when_every_member_is() {
        let blank = FieldValue::blank_group(&["weekday", "start_time"]);
        assert!(blank.is_blank());

        let partial = FieldValue::group([("weekday", "monday"), ("start_time", "")]);
        assert!(!partial.is_blank());
        assert_eq!(partial.member_text("weekday"), "monday");
        assert_eq!(partial.member_text("missing"), "");
    }

    #[test]
    fn serializes_as_plain_json() {
        let value = FieldValue::List(vec![FieldValue::group([("weekday", "friday")])]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!([{ "weekday": "friday" }]));
    }
}
