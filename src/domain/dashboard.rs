use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Aggregate figures for the admin dashboard. Figures the backend adds later
/// land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub total_teachers: u64,
    #[serde(default)]
    pub total_classrooms: u64,
    #[serde(default)]
    pub active_classrooms: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One summary card on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
}
