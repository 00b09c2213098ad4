use std::fmt;

/// Why the last submission attempt did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// The record failed validation; the effect was not invoked.
    Validation,
    /// The effect rejected with this message.
    Rejected(String),
}

impl SubmitFailure {
    pub fn message(&self) -> &str {
        match self {
            SubmitFailure::Validation => "validation",
            SubmitFailure::Rejected(message) => message,
        }
    }
}

/// Submission lifecycle of one form session.
///
/// `Idle -> Submitting -> Succeeded | Failed`, back to `Idle` through reset.
/// `Succeeded` is terminal for the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(SubmitFailure),
}

impl SubmissionStatus {
    pub fn failed(message: impl Into<String>) -> Self {
        SubmissionStatus::Failed(SubmitFailure::Rejected(message.into()))
    }

    /// Whether a new submission may start from this status.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, SubmissionStatus::Idle | SubmissionStatus::Failed(_))
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Idle => f.write_str("idle"),
            SubmissionStatus::Submitting => f.write_str("submitting"),
            SubmissionStatus::Succeeded => f.write_str("succeeded"),
            SubmissionStatus::Failed(reason) => write!(f, "failed ({})", reason.message()),
        }
    }
}

/// Result of one call to [`FormSession::submit`](crate::form::FormSession::submit).
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// The effect resolved; the session is now closed.
    Submitted(T),
    /// Validation failed; see the session's error map.
    Invalid,
    /// The effect rejected; the record is kept for a retry.
    Rejected(String),
    /// Another submission of this session is still running.
    InFlight,
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}
