use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

use crate::config::Config;
use crate::models::{
    Subject, TestAnalysis, TestDefinition, TestHistoryItem, TestRequest, TestResult,
    TestSubmission,
};

/// Server messages that mean the session is no longer valid on the server
/// side (e.g. it restarted and dropped in-memory attempts).
const SESSION_INVALID_MARKERS: [&str; 2] = ["Attempt not found", "Test not found"];

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("request failed: {0:#}")]
    Transport(#[source] anyhow::Error),

    /// The request payload failed client-side validation.
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl ApiError {
    /// Whether this failure means the server no longer recognizes the
    /// attempt or test, i.e. the local session must be discarded.
    pub fn is_session_invalid(&self) -> bool {
        let message = self.to_string();
        SESSION_INVALID_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

/// Remote test service consumed by the session. The session only depends on
/// this trait, so tests drive it with scripted in-process implementations.
#[async_trait]
pub trait TestApi: Send + Sync {
    /// Create an attempt for the test and return its server-issued id.
    async fn start(&self, test_id: i64) -> Result<i64, ApiError>;

    /// Submit the per-question answer records for grading.
    async fn submit(&self, submission: &TestSubmission) -> Result<TestResult, ApiError>;

    async fn generate_test(&self, request: &TestRequest) -> Result<TestDefinition, ApiError>;

    async fn get_test(&self, test_id: i64) -> Result<TestDefinition, ApiError>;

    async fn get_history(&self) -> Result<Vec<TestHistoryItem>, ApiError>;

    async fn get_analysis(&self, attempt_id: i64) -> Result<TestAnalysis, ApiError>;

    async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError>;
}

/// Production implementation speaking JSON over HTTP with optional bearer
/// authentication.
pub struct HttpTestApi {
    http_client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpTestApi {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http_client.request(method, url);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .context("Failed to reach test service")
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_error_message(body),
            });
        }

        response
            .json()
            .await
            .context("Failed to parse test service response")
            .map_err(ApiError::Transport)
    }
}

/// Pull the human-readable message out of an error response body. The
/// platform wraps errors as `{"message": "..."}`; anything else (non-JSON,
/// missing or non-string field) falls back to the raw body. Session
/// invalidation detection depends on the message surviving this intact.
fn extract_error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(body)
}

#[async_trait]
impl TestApi for HttpTestApi {
    async fn start(&self, test_id: i64) -> Result<i64, ApiError> {
        tracing::debug!("Creating attempt: test_id={}", test_id);
        let attempt_id: i64 = self
            .execute(self.request(Method::POST, &format!("/tests/{}/start", test_id)))
            .await?;
        tracing::info!("Attempt created: test_id={}, attempt_id={}", test_id, attempt_id);
        Ok(attempt_id)
    }

    async fn submit(&self, submission: &TestSubmission) -> Result<TestResult, ApiError> {
        tracing::info!(
            "Submitting attempt: attempt_id={}, answers={}",
            submission.attempt_id,
            submission.answers.len()
        );
        self.execute(self.request(Method::POST, "/tests/submit").json(submission))
            .await
    }

    async fn generate_test(&self, request: &TestRequest) -> Result<TestDefinition, ApiError> {
        request.validate()?;
        tracing::info!(
            "Generating test: subject_id={}, count={}, duration={}min",
            request.subject_id,
            request.count,
            request.duration_minutes
        );
        self.execute(self.request(Method::POST, "/tests/generate").json(request))
            .await
    }

    async fn get_test(&self, test_id: i64) -> Result<TestDefinition, ApiError> {
        self.execute(self.request(Method::GET, &format!("/tests/{}", test_id)))
            .await
    }

    async fn get_history(&self) -> Result<Vec<TestHistoryItem>, ApiError> {
        self.execute(self.request(Method::GET, "/tests/history"))
            .await
    }

    async fn get_analysis(&self, attempt_id: i64) -> Result<TestAnalysis, ApiError> {
        tracing::debug!("Fetching analysis: attempt_id={}", attempt_id);
        self.execute(self.request(
            Method::GET,
            &format!("/tests/attempts/{}/analysis", attempt_id),
        ))
        .await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.execute(self.request(Method::GET, "/subjects")).await
    }
}
