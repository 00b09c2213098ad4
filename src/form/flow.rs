use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::errors::FormError;
use crate::form::record::FormRecord;
use crate::form::schema::FieldSchema;
use crate::form::session::{FormSession, SessionMode};
use crate::form::status::SubmitOutcome;
use crate::form::value::FieldValue;

/// High-level form contract for entity-specific wizards.
///
/// Implementations describe their schema, supply initial values (when
/// editing existing entities), and turn a validated record into a typed
/// payload.
pub trait FormFlow {
    type Output;

    /// Schema controlling field order and validation.
    fn schema(&self) -> Arc<FieldSchema>;

    fn mode(&self) -> SessionMode {
        SessionMode::Create
    }

    /// Values used to seed the session; omitted keys take schema defaults.
    fn initial_values(&self) -> BTreeMap<String, FieldValue> {
        BTreeMap::new()
    }

    /// Builds the typed payload from a record that passed validation.
    fn commit(&self, record: &FormRecord) -> Result<Self::Output, FormError>;

    /// Opens a fresh session seeded from this flow.
    fn open_session(&self) -> FormSession {
        FormSession::open(self.schema(), self.mode(), self.initial_values())
    }
}

/// Submits `session`, committing its record through `flow` and handing the
/// typed payload to `effect`. A commit failure on a valid record comes back as
/// `Err(FormError::Commit)`.
pub async fn submit_flow<F, T, E, Eff, Fut>(
    session: &FormSession,
    flow: &F,
    effect: Eff,
) -> Result<SubmitOutcome<T>, FormError>
where
    F: FormFlow,
    Eff: FnOnce(F::Output) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    session
        .submit_with(|record| flow.commit(record), effect)
        .await
}
