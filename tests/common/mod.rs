#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use ecm_admin::{api::ApiClient, config::ConfigManager, errors::ApiError};
use once_cell::sync::Lazy;
use serde_json::Value;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn config_manager() -> ConfigManager {
    ConfigManager::with_base_dir(temp_dir()).expect("create config manager for temp dir")
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory [`ApiClient`] returning scripted responses in order.
#[derive(Default)]
pub struct FakeApiClient {
    responses: Mutex<HashMap<(&'static str, String), VecDeque<Result<Value, ApiError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &'static str, path: &str, response: Result<Value, ApiError>) {
        self.responses
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .get_mut(&(method, path.to_string()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ApiError::Status {
                    code: 404,
                    message: format!("no scripted response for {method} {path}"),
                })
            })
    }
}

#[async_trait]
impl ApiClient for FakeApiClient {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.answer("GET", path, None)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.answer("POST", path, Some(body))
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.answer("PATCH", path, Some(body))
    }
}
