//! Backend API boundary and the typed services built on it.

pub mod client;
pub mod services;

pub use client::{ApiClient, HttpApiClient};
pub use services::{
    ClassroomApi, ClassroomScope, CourseApi, DashboardApi, ScheduleApi, StudentApi, TeacherApi,
};
