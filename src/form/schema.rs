//! Declarative field schema and the rule primitives the validator runs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use strsim::levenshtein;

use crate::form::record::FormRecord;
use crate::form::value::FieldValue;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,11}$").expect("phone pattern compiles"));

const MAX_SUGGESTION_DISTANCE: usize = 3;

type RecordPredicate = dyn Fn(&FieldValue, &FormRecord) -> bool + Send + Sync;

/// Check over one complete row of a list field; `Err` carries the row message.
pub type RowCheck = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

/// Outcome of checking one rule against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RuleOutcome {
    Pass,
    Message(String),
    Entries(BTreeMap<usize, String>),
}

/// A single validation rule. Rules are pure functions of the current record.
#[derive(Clone)]
pub enum Rule {
    /// Fails when the value is blank after trimming.
    Required { message: String },
    /// Fails when a non-blank text value does not match `regex`.
    Pattern {
        regex: Regex,
        strip_whitespace: bool,
        message: String,
    },
    /// Fails when the predicate over the field value and whole record returns false.
    CrossField {
        predicate: Arc<RecordPredicate>,
        message: String,
    },
    /// Every row of a list field must have all of `keys` populated, then pass
    /// each of `checks`. Only the first failure of a row is reported.
    EachEntry {
        keys: Vec<String>,
        message: String,
        checks: Vec<RowCheck>,
    },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Rule::Pattern {
            regex,
            strip_whitespace: false,
            message: message.into(),
        }
    }

    /// `local@domain.tld` shape.
    pub fn email(message: impl Into<String>) -> Self {
        Self::pattern(EMAIL_PATTERN.clone(), message)
    }

    /// 10 or 11 digits once whitespace is removed.
    pub fn phone(message: impl Into<String>) -> Self {
        Rule::Pattern {
            regex: PHONE_PATTERN.clone(),
            strip_whitespace: true,
            message: message.into(),
        }
    }

    pub fn cross_field<P>(predicate: P, message: impl Into<String>) -> Self
    where
        P: Fn(&FieldValue, &FormRecord) -> bool + Send + Sync + 'static,
    {
        Rule::CrossField {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    /// Non-blank values must be a `YYYY-MM-DD` date.
    pub fn date(message: impl Into<String>) -> Self {
        Self::cross_field(
            |value, _| value.is_blank() || value.as_text().and_then(parse_date).is_some(),
            message,
        )
    }

    /// Non-blank values must be a 24-hour `HH:MM` time.
    pub fn time(message: impl Into<String>) -> Self {
        Self::cross_field(
            |value, _| value.is_blank() || value.as_text().and_then(parse_time).is_some(),
            message,
        )
    }

    /// The field's date must be strictly after the date in `other`. Only fires
    /// when both sides hold a parseable date.
    pub fn date_after(other: &'static str, message: impl Into<String>) -> Self {
        Self::cross_field(
            move |value, record| {
                let end = value.as_text().and_then(parse_date);
                let start = parse_date(record.text(other));
                match (start, end) {
                    (Some(start), Some(end)) => end > start,
                    _ => true,
                }
            },
            message,
        )
    }

    /// Same as [`Rule::date_after`] for `HH:MM` times.
    pub fn time_after(other: &'static str, message: impl Into<String>) -> Self {
        Self::cross_field(
            move |value, record| {
                let end = value.as_text().and_then(parse_time);
                let start = parse_time(record.text(other));
                match (start, end) {
                    (Some(start), Some(end)) => end > start,
                    _ => true,
                }
            },
            message,
        )
    }

    pub fn each_entry(keys: &[&str], message: impl Into<String>) -> Self {
        Rule::EachEntry {
            keys: keys.iter().map(|key| key.to_string()).collect(),
            message: message.into(),
            checks: Vec::new(),
        }
    }

    /// Adds a check run on rows that have every key filled in. No effect on
    /// other rules.
    pub fn with_row_check<C>(mut self, check: C) -> Self
    where
        C: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        if let Rule::EachEntry { checks, .. } = &mut self {
            checks.push(Arc::new(check));
        }
        self
    }

    pub(crate) fn check(&self, value: &FieldValue, record: &FormRecord) -> RuleOutcome {
        match self {
            Rule::Required { message } => {
                if value.is_blank() {
                    RuleOutcome::Message(message.clone())
                } else {
                    RuleOutcome::Pass
                }
            }
            Rule::Pattern {
                regex,
                strip_whitespace,
                message,
            } => {
                let Some(text) = value.as_text() else {
                    return RuleOutcome::Pass;
                };
                if text.trim().is_empty() {
                    return RuleOutcome::Pass;
                }
                let candidate: String = if *strip_whitespace {
                    text.chars().filter(|ch| !ch.is_whitespace()).collect()
                } else {
                    text.to_string()
                };
                if regex.is_match(&candidate) {
                    RuleOutcome::Pass
                } else {
                    RuleOutcome::Message(message.clone())
                }
            }
            Rule::CrossField { predicate, message } => {
                if predicate(value, record) {
                    RuleOutcome::Pass
                } else {
                    RuleOutcome::Message(message.clone())
                }
            }
            Rule::EachEntry {
                keys,
                message,
                checks,
            } => {
                let Some(rows) = value.as_list() else {
                    return RuleOutcome::Pass;
                };
                let failing: BTreeMap<usize, String> = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(index, row)| {
                        let incomplete = keys
                            .iter()
                            .any(|key| row.member_text(key).trim().is_empty());
                        if incomplete {
                            return Some((index, message.clone()));
                        }
                        checks
                            .iter()
                            .find_map(|check| check(row).err())
                            .map(|failure| (index, failure))
                    })
                    .collect();
                if failing.is_empty() {
                    RuleOutcome::Pass
                } else {
                    RuleOutcome::Entries(failing)
                }
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required { message } => f.debug_tuple("Required").field(message).finish(),
            Rule::Pattern { regex, message, .. } => f
                .debug_struct("Pattern")
                .field("regex", &regex.as_str())
                .field("message", message)
                .finish(),
            Rule::CrossField { message, .. } => {
                f.debug_tuple("CrossField").field(message).finish()
            }
            Rule::EachEntry {
                keys,
                message,
                checks,
            } => f
                .debug_struct("EachEntry")
                .field("keys", keys)
                .field("message", message)
                .field("checks", &checks.len())
                .finish(),
        }
    }
}

/// Parses `YYYY-MM-DD`, ignoring a trailing `T…` time component.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let date_part = input.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parses a 24-hour `HH:MM` time; a seconds component is tolerated.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Declarative description of a single form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub default: FieldValue,
    pub rules: Vec<Rule>,
    pub help: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, default: FieldValue) -> Self {
        Self {
            key,
            label,
            default,
            rules: Vec::new(),
            help: None,
        }
    }

    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldValue::empty_text())
    }

    pub fn number(key: &'static str, label: &'static str, default: f64) -> Self {
        Self::new(key, label, FieldValue::Number(default))
    }

    pub fn list(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldValue::List(Vec::new()))
    }

    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = default.into();
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.with_rule(Rule::required(message))
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule, Rule::Required { .. }))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.default, FieldValue::List(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self.default, FieldValue::Number(_))
    }

    /// Member keys of one row, taken from the field's each-entry rule.
    pub fn row_keys(&self) -> Vec<&str> {
        self.rules
            .iter()
            .find_map(|rule| match rule {
                Rule::EachEntry { keys, .. } => Some(keys.iter().map(String::as_str).collect()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Ordered set of fields making up one form.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl FieldSchema {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    pub fn descriptor(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.descriptor(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.key)
    }

    /// Closest declared key to `input`, if any is near enough to be a typo.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        self.keys()
            .map(|key| (levenshtein(key, input), key))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, key)| key)
    }
}
