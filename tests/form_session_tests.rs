use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ecm_admin::errors::FormError;
use ecm_admin::form::{
    submit_flow, FieldDescriptor, FieldSchema, FieldValue, FormFlow, FormRecord, FormSession,
    Rule, SessionMode, SubmissionStatus, SubmitFailure, SubmitOutcome,
};
use tokio::sync::oneshot;

fn contact_schema() -> Arc<FieldSchema> {
    Arc::new(FieldSchema::new(
        "contact",
        vec![
            FieldDescriptor::text("name", "Name").required("Name is required"),
            FieldDescriptor::text("email", "Email")
                .required("Email is required")
                .with_rule(Rule::email("Email is invalid")),
        ],
    ))
}

fn term_schema() -> Arc<FieldSchema> {
    Arc::new(FieldSchema::new(
        "term",
        vec![
            FieldDescriptor::text("title", "Title"),
            FieldDescriptor::text("start_date", "Start date").required("Start date is required"),
            FieldDescriptor::text("end_date", "End date")
                .required("End date is required")
                .with_rule(Rule::date_after("start_date", "End date must be after start date")),
        ],
    ))
}

fn schedule_schema() -> Arc<FieldSchema> {
    Arc::new(FieldSchema::new(
        "timetable",
        vec![FieldDescriptor::list("schedules", "Schedules").with_rule(Rule::each_entry(
            &["weekday", "start_time", "end_time"],
            "Incomplete schedule",
        ))],
    ))
}

fn open(schema: Arc<FieldSchema>) -> FormSession {
    FormSession::open(schema, SessionMode::Create, BTreeMap::new())
}

#[tokio::test]
async fn scenario_a_fix_errors_then_submit_once() {
    let session = open(contact_schema());
    session.set_field("email", "bad").unwrap();
    assert!(!session.validate());
    let errors = session.errors();
    assert_eq!(errors.message("email"), Some("Email is invalid"));
    assert_eq!(errors.message("name"), Some("Name is required"));

    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "a@b.com").unwrap();
    assert!(session.validate());
    assert!(session.errors().is_empty());

    let calls = AtomicUsize::new(0);
    let outcome = session
        .submit(|record| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, String>(record.text("email").to_string()) }
        })
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Submitted("a@b.com".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.status(), SubmissionStatus::Succeeded);
    assert!(session.is_closed());
    // create sessions hand back a fresh record after success
    assert_eq!(session.record().text("name"), "");
}

#[test]
fn scenario_b_flags_only_the_incomplete_row() {
    let session = open(schedule_schema());
    session
        .add_entry(
            "schedules",
            FieldValue::group([("weekday", "monday"), ("start_time", "07:00"), ("end_time", "08:30")]),
        )
        .unwrap();
    session
        .add_entry(
            "schedules",
            FieldValue::group([("weekday", "wednesday"), ("start_time", "07:00"), ("end_time", "")]),
        )
        .unwrap();

    assert!(!session.validate());
    let errors = session.errors();
    assert_eq!(errors.entry_error("schedules", 0), None);
    assert_eq!(errors.entry_error("schedules", 1), Some("Incomplete schedule"));
}

#[test]
fn removing_a_row_shifts_later_row_errors() {
    let session = open(schedule_schema());
    for _ in 0..3 {
        session
            .add_entry("schedules", FieldValue::blank_group(&["weekday", "start_time", "end_time"]))
            .unwrap();
    }
    session.set_entry_field("schedules", 0, "weekday", "monday").unwrap();
    session.set_entry_field("schedules", 0, "start_time", "07:00").unwrap();
    session.set_entry_field("schedules", 0, "end_time", "08:30").unwrap();
    session.validate();
    assert!(session.errors().entry_error("schedules", 0).is_none());

    session.remove_entry("schedules", 1).unwrap();
    let errors = session.errors();
    assert_eq!(session.record().list("schedules").len(), 2);
    assert!(errors.entry_error("schedules", 0).is_none());
    assert!(errors.entry_error("schedules", 1).is_some());
    assert!(errors.entry_error("schedules", 2).is_none());
}

#[tokio::test]
async fn scenario_c_rejection_keeps_record_and_allows_retry() {
    let session = open(contact_schema());
    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "a@b.com").unwrap();
    let before = session.record();

    let outcome = session
        .submit(|_| async { Err::<(), _>("network error") })
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Rejected("network error".into()));
    assert_eq!(
        session.status(),
        SubmissionStatus::Failed(SubmitFailure::Rejected("network error".into()))
    );
    assert_eq!(session.record(), before);
    assert!(!session.is_closed());

    let retried = session
        .submit(|record| async move { Ok::<_, String>(record.len()) })
        .await
        .unwrap();
    assert_eq!(retried, SubmitOutcome::Submitted(2));
}

#[tokio::test]
async fn invalid_submit_never_invokes_effect() {
    let session = open(contact_schema());
    let calls = AtomicUsize::new(0);
    let outcome = session
        .submit(|_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(()) }
        })
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.status(), SubmissionStatus::Failed(SubmitFailure::Validation));
    assert!(session.errors().contains("name"));
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let session = open(contact_schema());
    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "a@b.com").unwrap();

    let (release, gate) = oneshot::channel::<()>();
    let calls = AtomicUsize::new(0);

    let first = session.submit(|_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            gate.await.ok();
            Ok::<_, String>("first")
        }
    });
    let second = async {
        tokio::task::yield_now().await;
        assert!(session.status().is_submitting());
        let outcome = session
            .submit(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>("second") }
            })
            .await
            .unwrap();
        release.send(()).ok();
        outcome
    };

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap(), SubmitOutcome::Submitted("first"));
    assert_eq!(second, SubmitOutcome::InFlight);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn closing_during_submit_discards_the_result() {
    let session = open(contact_schema());
    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "a@b.com").unwrap();
    let handle = session.clone();

    let outcome = session
        .submit(|_| async move {
            handle.close();
            Err::<(), _>("server unavailable")
        })
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Rejected("server unavailable".into()));
    // status stays where the close left it
    assert_eq!(session.status(), SubmissionStatus::Submitting);
    assert_eq!(session.set_field("name", "Bob").unwrap_err(), FormError::SessionClosed);
}

#[tokio::test]
async fn edit_session_closes_on_success_and_keeps_values() {
    let mut initial = BTreeMap::new();
    initial.insert("name".to_string(), FieldValue::from("Ann"));
    initial.insert("email".to_string(), FieldValue::from("ann@example.com"));
    let session = FormSession::open(contact_schema(), SessionMode::edit("st-1"), initial);
    session.set_field("name", "Anne").unwrap();

    let outcome = session
        .submit(|record| async move { Ok::<_, String>(record.text("name").to_string()) })
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted("Anne".to_string()));
    assert!(session.is_closed());
    assert_eq!(session.record().text("name"), "Anne");
    assert_eq!(session.reset().unwrap_err(), FormError::SessionClosed);

    let again = session
        .submit(|_| async { Ok::<_, String>(String::new()) })
        .await
        .unwrap_err();
    assert_eq!(again, FormError::SessionClosed);
}

#[test]
fn required_field_error_tracks_whitespace() {
    let session = open(contact_schema());
    session.set_field("name", "   ").unwrap();
    session.validate();
    assert_eq!(session.errors().message("name"), Some("Name is required"));

    session.set_field("name", "Ann").unwrap();
    session.validate();
    assert!(!session.errors().contains("name"));
}

#[test]
fn validate_is_idempotent() {
    let session = open(contact_schema());
    session.set_field("email", "nope").unwrap();
    session.validate();
    let first = session.errors();
    session.validate();
    assert_eq!(first, session.errors());
}

#[test]
fn end_date_error_follows_date_ordering() {
    let cases = [
        ("2024-01-10", "2024-01-09", true),
        ("2024-01-10", "2024-01-10", true),
        ("2024-01-10", "2024-01-11", false),
        ("2023-12-31", "2024-01-01", false),
        ("2024-02-28", "2024-02-29", false),
        ("2024-06-01T00:00:00", "2024-05-31", true),
    ];
    for (start, end, expect_error) in cases {
        for title in ["", "Autumn term"] {
            let session = open(term_schema());
            session.set_field("title", title).unwrap();
            session.set_field("start_date", start).unwrap();
            session.set_field("end_date", end).unwrap();
            session.validate();
            assert_eq!(
                session.errors().contains("end_date"),
                expect_error,
                "start {start} end {end}"
            );
        }
    }
}

#[test]
fn initial_record_matches_declared_keys() {
    let mut initial = BTreeMap::new();
    initial.insert("name".to_string(), FieldValue::from("Ann"));
    initial.insert("nickname".to_string(), FieldValue::from("An"));
    let session = FormSession::open(contact_schema(), SessionMode::Create, initial);
    let record = session.record();
    let keys: Vec<&str> = record.keys().collect();
    assert_eq!(keys, vec!["email", "name"]);
    assert_eq!(record.text("email"), "");
}

#[tokio::test]
async fn reset_after_failure_returns_to_idle() {
    let session = open(contact_schema());
    session.set_field("name", "Ann").unwrap();
    session.submit(|_| async { Ok::<_, String>(()) }).await.unwrap();
    assert_eq!(session.status(), SubmissionStatus::Failed(SubmitFailure::Validation));

    session.reset().unwrap();
    assert_eq!(session.status(), SubmissionStatus::Idle);
    assert_eq!(session.record().text("name"), "");
    assert!(session.errors().is_empty());
}

#[tokio::test]
async fn reset_is_refused_while_submitting() {
    let session = open(contact_schema());
    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "a@b.com").unwrap();

    let (release, gate) = oneshot::channel::<()>();
    let submit = session.submit(|_| async move {
        gate.await.ok();
        Ok::<_, String>(())
    });
    let attempt = async {
        tokio::task::yield_now().await;
        let refused = session.reset();
        release.send(()).ok();
        refused
    };

    let (outcome, refused) = tokio::join!(submit, attempt);
    assert_eq!(refused.unwrap_err(), FormError::SubmissionInFlight);
    assert_eq!(outcome.unwrap(), SubmitOutcome::Submitted(()));
}

#[tokio::test]
async fn submit_is_allowed_again_after_validation_failure() {
    let session = open(contact_schema());
    session.set_field("email", "a@b.com").unwrap();
    let first = session
        .submit(|_| async { Ok::<_, String>("unused") })
        .await
        .unwrap();
    assert_eq!(first, SubmitOutcome::Invalid);
    assert_eq!(session.status(), SubmissionStatus::Failed(SubmitFailure::Validation));

    session.set_field("name", "Ann").unwrap();
    let (release, gate) = oneshot::channel::<()>();
    let retry = session.submit(|record| async move {
        gate.await.ok();
        Ok::<_, String>(record.text("name").to_string())
    });
    let observe = async {
        tokio::task::yield_now().await;
        let status = session.status();
        release.send(()).ok();
        status
    };

    let (retry, status_in_flight) = tokio::join!(retry, observe);
    assert_eq!(status_in_flight, SubmissionStatus::Submitting);
    assert_eq!(retry.unwrap(), SubmitOutcome::Submitted("Ann".to_string()));
}

#[tokio::test]
async fn create_session_returns_to_its_seed_after_success() {
    let mut initial = BTreeMap::new();
    initial.insert("email".to_string(), FieldValue::from("front-desk@example.com"));
    let session = FormSession::open(contact_schema(), SessionMode::Create, initial);
    let seed = session.record();
    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "ann@example.com").unwrap();

    let (release, gate) = oneshot::channel::<()>();
    let submit = session.submit(|record| async move {
        gate.await.ok();
        Ok::<_, String>(record.text("email").to_string())
    });
    let observe = async {
        tokio::task::yield_now().await;
        let during = session.record();
        release.send(()).ok();
        during
    };

    let (outcome, during) = tokio::join!(submit, observe);
    assert_eq!(during.text("name"), "Ann");
    assert_eq!(outcome.unwrap(), SubmitOutcome::Submitted("ann@example.com".to_string()));
    assert_eq!(session.record(), seed);
    assert_eq!(session.record().text("email"), "front-desk@example.com");
    assert!(session.errors().is_empty());
}

struct BrokenFlow;

impl FormFlow for BrokenFlow {
    type Output = ();

    fn schema(&self) -> Arc<FieldSchema> {
        contact_schema()
    }

    fn commit(&self, _record: &FormRecord) -> Result<(), FormError> {
        Err(FormError::Commit("payload mismatch".into()))
    }
}

#[tokio::test]
async fn commit_failure_is_a_contract_error_not_a_rejection() {
    let flow = BrokenFlow;
    let session = flow.open_session();
    session.set_field("name", "Ann").unwrap();
    session.set_field("email", "a@b.com").unwrap();
    let calls = AtomicUsize::new(0);

    let err = submit_flow(&session, &flow, |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, String>(()) }
    })
    .await
    .unwrap_err();

    assert_eq!(err, FormError::Commit("payload mismatch".into()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.status(), SubmissionStatus::Idle);
    assert!(!session.is_closed());
}
