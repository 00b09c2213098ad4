//! The form session controller shared by every create/edit dialog.
//!
//! A session is opened when a dialog opens, seeded from either the schema
//! defaults (create) or an existing record (edit), and is discarded when the
//! dialog closes. Clones of a [`FormSession`] are handles onto the same state,
//! so the dialog's input handlers and its submit button can each hold one.
//! The status guard in [`FormSession::submit`] keeps at most one submission in
//! flight per session.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::FormError;
use crate::form::record::FormRecord;
use crate::form::schema::FieldSchema;
use crate::form::status::{SubmissionStatus, SubmitFailure, SubmitOutcome};
use crate::form::validation::{validate_record, ErrorMap};
use crate::form::value::FieldValue;

/// Whether the session creates a new entity or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit { id: String },
}

impl SessionMode {
    pub fn edit(id: impl Into<String>) -> Self {
        SessionMode::Edit { id: id.into() }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            SessionMode::Create => None,
            SessionMode::Edit { id } => Some(id),
        }
    }
}

struct SessionState {
    record: FormRecord,
    snapshot: FormRecord,
    errors: ErrorMap,
    status: SubmissionStatus,
    closed: bool,
}

#[derive(Clone)]
pub struct FormSession {
    id: Uuid,
    schema: Arc<FieldSchema>,
    mode: SessionMode,
    state: Arc<Mutex<SessionState>>,
}

impl FormSession {
    /// Opens a session over `schema`, seeded from `initial`.
    pub fn open(
        schema: Arc<FieldSchema>,
        mode: SessionMode,
        initial: BTreeMap<String, FieldValue>,
    ) -> Self {
        let record = FormRecord::from_schema(&schema, initial);
        let id = Uuid::new_v4();
        debug!(session = %id, form = schema.name, ?mode, "form session opened");
        Self {
            id,
            mode,
            state: Arc::new(Mutex::new(SessionState {
                snapshot: record.clone(),
                record,
                errors: ErrorMap::default(),
                status: SubmissionStatus::Idle,
                closed: false,
            })),
            schema,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn record(&self) -> FormRecord {
        self.lock().record.clone()
    }

    pub fn errors(&self) -> ErrorMap {
        self.lock().errors.clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.lock().status.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Updates one field and drops its stale error without revalidating.
    pub fn set_field(&self, name: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        self.ensure_declared(name)?;
        let mut state = self.lock_open()?;
        state.record.set(name, value.into());
        if state.errors.clear(name) {
            debug!(session = %self.id, field = name, "cleared stale field error");
        }
        Ok(())
    }

    /// Sets `key` inside row `index` of the list field `name`, clearing only
    /// that row's error.
    pub fn set_entry_field(
        &self,
        name: &str,
        index: usize,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.ensure_declared(name)?;
        let value: FieldValue = value.into();
        let mut state = self.lock_open()?;
        let rows = list_mut(&mut state.record, name)?;
        let len = rows.len();
        let row = rows.get_mut(index).ok_or_else(|| FormError::EntryOutOfRange {
            name: name.to_string(),
            index,
            len,
        })?;
        match row {
            FieldValue::Group(members) => {
                members.insert(key.to_string(), value);
            }
            other => *other = FieldValue::group([(key, value)]),
        }
        state.errors.clear_entry(name, index);
        Ok(())
    }

    /// Appends a row to the list field `name`.
    pub fn add_entry(&self, name: &str, entry: FieldValue) -> Result<usize, FormError> {
        self.ensure_declared(name)?;
        let mut state = self.lock_open()?;
        let rows = list_mut(&mut state.record, name)?;
        rows.push(entry);
        Ok(rows.len() - 1)
    }

    /// Removes row `index` of the list field `name`; later row errors move up.
    pub fn remove_entry(&self, name: &str, index: usize) -> Result<FieldValue, FormError> {
        self.ensure_declared(name)?;
        let mut state = self.lock_open()?;
        let rows = list_mut(&mut state.record, name)?;
        if index >= rows.len() {
            return Err(FormError::EntryOutOfRange {
                name: name.to_string(),
                index,
                len: rows.len(),
            });
        }
        let removed = rows.remove(index);
        state.errors.remove_entry(name, index);
        Ok(removed)
    }

    /// Runs the schema against the current record and stores the result.
    /// Returns whether the record is valid.
    pub fn validate(&self) -> bool {
        let mut state = self.lock();
        let errors = validate_record(&self.schema, &state.record);
        let valid = errors.is_empty();
        debug!(session = %self.id, errors = errors.len(), "form validated");
        state.errors = errors;
        valid
    }

    /// Validates, then runs `effect` with a snapshot of the record.
    ///
    /// Returns [`SubmitOutcome::InFlight`] without invoking `effect` while a
    /// previous submission is still running. On success a create session
    /// resets its record, and the session closes either way.
    pub async fn submit<T, E, F, Fut>(&self, effect: F) -> Result<SubmitOutcome<T>, FormError>
    where
        F: FnOnce(FormRecord) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.submit_with(|record| Ok(record.clone()), effect).await
    }

    /// Like [`FormSession::submit`], but first turns the validated record into
    /// a payload with `commit`.
    ///
    /// A record that passes validation but fails `commit` means the schema and
    /// the payload builder disagree: the error is returned as is, the status is
    /// left untouched and `effect` is not invoked.
    pub async fn submit_with<P, T, E, C, F, Fut>(
        &self,
        commit: C,
        effect: F,
    ) -> Result<SubmitOutcome<T>, FormError>
    where
        C: FnOnce(&FormRecord) -> Result<P, FormError>,
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let payload = {
            let mut state = self.lock_open()?;
            if !state.status.accepts_submit() {
                debug!(session = %self.id, status = %state.status, "submit ignored");
                return Ok(SubmitOutcome::InFlight);
            }
            let errors = validate_record(&self.schema, &state.record);
            if !errors.is_empty() {
                state.errors = errors;
                state.status = SubmissionStatus::Failed(SubmitFailure::Validation);
                debug!(session = %self.id, "submit blocked by validation");
                return Ok(SubmitOutcome::Invalid);
            }
            let payload = commit(&state.record).map_err(|err| {
                warn!(session = %self.id, form = self.schema.name, error = %err, "validated record failed to commit");
                err
            })?;
            state.errors = errors;
            state.status = SubmissionStatus::Submitting;
            payload
        };

        let result = effect(payload).await;

        let mut state = self.lock();
        if state.closed {
            debug!(session = %self.id, "session closed during submit; discarding result");
            return Ok(match result {
                Ok(value) => SubmitOutcome::Submitted(value),
                Err(err) => SubmitOutcome::Rejected(err.to_string()),
            });
        }

        match result {
            Ok(value) => {
                state.status = SubmissionStatus::Succeeded;
                if self.mode == SessionMode::Create {
                    state.record = state.snapshot.clone();
                    state.errors = ErrorMap::default();
                }
                state.closed = true;
                info!(session = %self.id, form = self.schema.name, "form submitted");
                Ok(SubmitOutcome::Submitted(value))
            }
            Err(err) => {
                let message = err.to_string();
                warn!(session = %self.id, form = self.schema.name, error = %message, "submission rejected");
                state.status = SubmissionStatus::failed(message.clone());
                Ok(SubmitOutcome::Rejected(message))
            }
        }
    }

    /// Restores the initial snapshot, clears errors, and returns to `Idle`.
    pub fn reset(&self) -> Result<(), FormError> {
        let mut state = self.lock_open()?;
        if state.status.is_submitting() {
            return Err(FormError::SubmissionInFlight);
        }
        state.record = state.snapshot.clone();
        state.errors = ErrorMap::default();
        state.status = SubmissionStatus::Idle;
        debug!(session = %self.id, "form reset");
        Ok(())
    }

    /// Marks the owning dialog as closed. Further edits are refused and the
    /// result of any in-flight submission is discarded.
    pub fn close(&self) {
        let mut state = self.lock();
        if !state.closed {
            state.closed = true;
            debug!(session = %self.id, "form session closed");
        }
    }

    fn ensure_declared(&self, name: &str) -> Result<(), FormError> {
        if self.schema.contains(name) {
            Ok(())
        } else {
            Err(FormError::InvalidField {
                form: self.schema.name.to_string(),
                name: name.to_string(),
                suggestion: self.schema.suggest(name).map(str::to_string),
            })
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, SessionState>, FormError> {
        let state = self.lock();
        if state.closed {
            Err(FormError::SessionClosed)
        } else {
            Ok(state)
        }
    }
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("id", &self.id)
            .field("form", &self.schema.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn list_mut<'a>(record: &'a mut FormRecord, name: &str) -> Result<&'a mut Vec<FieldValue>, FormError> {
    match record.get_mut(name) {
        Some(FieldValue::List(rows)) => Ok(rows),
        _ => Err(FormError::NotAList {
            name: name.to_string(),
        }),
    }
}
