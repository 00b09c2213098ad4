//! Explicit application state handed to whatever drives the dialogs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{
    ApiClient, ClassroomApi, CourseApi, DashboardApi, ScheduleApi, StudentApi, TeacherApi,
};
use crate::config::Config;
use crate::domain::UserRole;

/// Open/closed state of the personal-info dialog. Closing keeps the last
/// role so the dialog can animate out with its content intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfoContext {
    open: bool,
    role: Option<UserRole>,
}

impl PersonalInfoContext {
    pub fn open_modal(&mut self, role: UserRole) {
        self.role = Some(role);
        self.open = true;
    }

    pub fn close_modal(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn role(&self) -> Option<UserRole> {
        self.role
    }
}

/// The signed-in user as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "role_name")]
    pub role: UserRole,
}

impl UserInfo {
    /// Role label for the navigation bar.
    pub fn role_label(&self) -> &'static str {
        self.role.label()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    user: Option<UserInfo>,
}

impl UserSession {
    pub fn sign_in(&mut self, user: UserInfo) {
        tracing::info!(user = %user.id, role = %user.role, "signed in");
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) -> Option<UserInfo> {
        let user = self.user.take();
        if let Some(user) = &user {
            tracing::info!(user = %user.id, "signed out");
        }
        user
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Everything a dialog needs, constructed once and passed by reference.
pub struct AppContext {
    config: Config,
    client: Arc<dyn ApiClient>,
    pub personal_info: PersonalInfoContext,
    pub session: UserSession,
}

impl AppContext {
    pub fn new(config: Config, client: Arc<dyn ApiClient>) -> Self {
        Self {
            config,
            client,
            personal_info: PersonalInfoContext::default(),
            session: UserSession::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> Arc<dyn ApiClient> {
        Arc::clone(&self.client)
    }

    pub fn students(&self) -> StudentApi {
        StudentApi::new(self.client())
    }

    pub fn teachers(&self) -> TeacherApi {
        TeacherApi::new(self.client())
    }

    pub fn courses(&self) -> CourseApi {
        CourseApi::new(self.client())
    }

    /// Classroom endpoints matching the signed-in role; staff otherwise.
    pub fn classrooms(&self) -> ClassroomApi {
        match self.session.role() {
            Some(UserRole::Admin) => ClassroomApi::admin(self.client()),
            _ => ClassroomApi::staff(self.client()),
        }
    }

    pub fn schedules(&self) -> ScheduleApi {
        ScheduleApi::new(self.client())
    }

    pub fn dashboard(&self) -> DashboardApi {
        DashboardApi::new(self.client())
    }

    /// Tears down the user session and any per-user dialog state.
    pub fn sign_out(&mut self) -> Option<UserInfo> {
        self.personal_info = PersonalInfoContext::default();
        self.session.sign_out()
    }
}
