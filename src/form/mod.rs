//! Reusable form state and validation lifecycle.

pub mod flow;
pub mod record;
pub mod schema;
pub mod session;
pub mod status;
pub mod validation;
pub mod value;

pub use flow::{submit_flow, FormFlow};
pub use record::FormRecord;
pub use schema::{parse_date, parse_time, FieldDescriptor, FieldSchema, RowCheck, Rule};
pub use session::{FormSession, SessionMode};
pub use status::{SubmissionStatus, SubmitFailure, SubmitOutcome};
pub use validation::{validate_record, ErrorMap, FieldError};
pub use value::FieldValue;
