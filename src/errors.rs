use std::io;

use thiserror::Error;

/// Contract violations raised by a form session.
///
/// These indicate a mismatch between the schema and the code driving it, or an
/// operation attempted on a session that no longer accepts edits. Validation
/// failures never show up here; they live in the session's error map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field `{name}` in form `{form}`{}", suggestion_hint(.suggestion))]
    InvalidField {
        form: String,
        name: String,
        suggestion: Option<String>,
    },
    #[error("field `{name}` does not hold a list of entries")]
    NotAList { name: String },
    #[error("row {index} is out of range for `{name}` ({len} rows)")]
    EntryOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
    #[error("form session is closed")]
    SessionClosed,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("cannot build payload: {0}")]
    Commit(String),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(key) => format!(" (did you mean `{key}`?)"),
        None => String::new(),
    }
}

/// Failures reported by the backend API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { code: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Errors raised while loading or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_message_includes_suggestion() {
        let err = FormError::InvalidField {
            form: "student".into(),
            name: "emial".into(),
            suggestion: Some("email".into()),
        };
        assert_eq!(
            err.to_string(),
            "unknown field `emial` in form `student` (did you mean `email`?)"
        );
    }

    #[test]
    fn status_error_displays_server_message() {
        let err = ApiError::Status {
            code: 409,
            message: "Email already registered".into(),
        };
        assert_eq!(err.to_string(), "Email already registered");
    }
}
