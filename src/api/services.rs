//! Typed wrappers over [`ApiClient`] for each backend resource.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::client::ApiClient;
use crate::domain::{
    Classroom, ClassroomUpdate, Course, DashboardStats, Schedule, ScheduleCreate, StatCard,
    Student, StudentCreate, StudentUpdate, Teacher, TeacherCreate,
};
use crate::errors::{ApiError, FormError};
use crate::form::{submit_flow, FormSession, SubmitOutcome};
use crate::wizards::{ClassroomWizard, ScheduleWizard, StudentSubmission, StudentWizard, TeacherWizard};

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Accepts either a bare array or an envelope with `items` or `data`.
pub(crate) fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Object(mut envelope) => {
            let items = envelope
                .remove("items")
                .or_else(|| envelope.remove("data"))
                .ok_or_else(|| ApiError::Decode("expected a list of records".into()))?;
            decode(items)
        }
        other => decode(other),
    }
}

pub(crate) fn encode<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|err| ApiError::Decode(err.to_string()))
}

#[derive(Clone)]
pub struct StudentApi {
    client: Arc<dyn ApiClient>,
}

impl StudentApi {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Student>, ApiError> {
        decode_list(self.client.get("/staff/students").await?)
    }

    pub async fn create(&self, payload: &StudentCreate) -> Result<Student, ApiError> {
        decode(self.client.post("/staff/students", encode(payload)?).await?)
    }

    pub async fn update(&self, id: &str, payload: &StudentUpdate) -> Result<Student, ApiError> {
        let path = format!("/staff/students/{id}");
        decode(self.client.patch(&path, encode(payload)?).await?)
    }

    /// Submits a student dialog, creating or updating depending on its mode.
    pub async fn submit(
        &self,
        session: &FormSession,
        wizard: &StudentWizard,
    ) -> Result<SubmitOutcome<Student>, FormError> {
        submit_flow(session, wizard, |submission| async move {
            match submission {
                StudentSubmission::Create(payload) => self.create(&payload).await,
                StudentSubmission::Update { id, changes } => self.update(&id, &changes).await,
            }
        })
        .await
    }
}

#[derive(Clone)]
pub struct TeacherApi {
    client: Arc<dyn ApiClient>,
}

impl TeacherApi {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Teacher>, ApiError> {
        decode_list(self.client.get("/admin/teachers").await?)
    }

    pub async fn create(&self, payload: &TeacherCreate) -> Result<Teacher, ApiError> {
        decode(self.client.post("/admin/teachers", encode(payload)?).await?)
    }

    pub async fn submit(
        &self,
        session: &FormSession,
        wizard: &TeacherWizard,
    ) -> Result<SubmitOutcome<Teacher>, FormError> {
        submit_flow(session, wizard, |payload| async move { self.create(&payload).await }).await
    }
}

#[derive(Clone)]
pub struct CourseApi {
    client: Arc<dyn ApiClient>,
}

impl CourseApi {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Course>, ApiError> {
        decode_list(self.client.get("/admin/courses").await?)
    }
}

/// Which classroom endpoints a dialog talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassroomScope {
    Admin,
    Staff,
}

impl ClassroomScope {
    fn prefix(self) -> &'static str {
        match self {
            ClassroomScope::Admin => "/admin/classrooms",
            ClassroomScope::Staff => "/staff/classrooms",
        }
    }
}

#[derive(Clone)]
pub struct ClassroomApi {
    client: Arc<dyn ApiClient>,
    scope: ClassroomScope,
}

impl ClassroomApi {
    pub fn admin(client: Arc<dyn ApiClient>) -> Self {
        Self {
            client,
            scope: ClassroomScope::Admin,
        }
    }

    pub fn staff(client: Arc<dyn ApiClient>) -> Self {
        Self {
            client,
            scope: ClassroomScope::Staff,
        }
    }

    pub fn scope(&self) -> ClassroomScope {
        self.scope
    }

    pub async fn list(&self) -> Result<Vec<Classroom>, ApiError> {
        decode_list(self.client.get(self.scope.prefix()).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Classroom, ApiError> {
        let path = format!("{}/{id}", self.scope.prefix());
        decode(self.client.get(&path).await?)
    }

    pub async fn update(&self, id: &str, payload: &ClassroomUpdate) -> Result<Classroom, ApiError> {
        let path = format!("{}/{id}", self.scope.prefix());
        decode(self.client.patch(&path, encode(payload)?).await?)
    }

    pub async fn submit(
        &self,
        session: &FormSession,
        wizard: &ClassroomWizard,
    ) -> Result<SubmitOutcome<Classroom>, FormError> {
        submit_flow(session, wizard, |submission| async move {
            self.update(&submission.id, &submission.changes).await
        })
        .await
    }
}

#[derive(Clone)]
pub struct ScheduleApi {
    client: Arc<dyn ApiClient>,
}

impl ScheduleApi {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn create(&self, payload: &ScheduleCreate) -> Result<Schedule, ApiError> {
        decode(self.client.post("/staff/schedules", encode(payload)?).await?)
    }

    pub async fn submit(
        &self,
        session: &FormSession,
        wizard: &ScheduleWizard,
    ) -> Result<SubmitOutcome<Schedule>, FormError> {
        submit_flow(session, wizard, |payload| async move { self.create(&payload).await }).await
    }
}

#[derive(Clone)]
pub struct DashboardApi {
    client: Arc<dyn ApiClient>,
}

impl DashboardApi {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        decode(self.client.get("/admin/dashboard/stats").await?)
    }

    pub async fn stat_cards(&self) -> Result<Vec<StatCard>, ApiError> {
        decode_list(self.client.get("/admin/dashboard/stat-cards").await?)
    }
}
