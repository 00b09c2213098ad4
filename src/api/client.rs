use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;

use crate::config::Config;
use crate::errors::ApiError;

/// Narrow boundary to the backend REST API.
///
/// Every call is a single request/response. Implementations are expected to
/// be cheap to share behind an `Arc`.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, ApiError>;
    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiError>;
}

/// [`ApiClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        tracing::debug!(%method, path, "api request");
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        read_response(response).await
    }
}

async fn read_response(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let message = error_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::warn!(status = status.as_u16(), %message, "api request failed");
        return Err(ApiError::Status {
            code: status.as_u16(),
            message,
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Extracts the server's `detail` or `message` text from an error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| match value.get(*key) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(Method::PATCH, path, Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let config = Config {
            api_base_url: "https://ecm.example/api/".into(),
            ..Config::default()
        };
        let client = HttpApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://ecm.example/api");
        assert_eq!(client.url("/admin/students"), "https://ecm.example/api/admin/students");
        assert_eq!(client.url("admin/courses"), "https://ecm.example/api/admin/courses");
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail":"Email already registered"}"#).as_deref(),
            Some("Email already registered")
        );
        assert_eq!(
            error_message(r#"{"message":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(error_message("<html>"), None);
    }
}
