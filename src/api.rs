//! REST client for the video-processing backend.
//!
//! Wraps the two job endpoints (submission and status) using
//! [`reqwest`]. The controller only sees the [`JobApi`] trait, so tests
//! can script the backend without a server.

use std::future::Future;

use serde::Deserialize;

use crate::model::JobRequest;

/// Response of `POST /api/process-video`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Backend-assigned job identifier.
    pub job_id: String,
}

/// Response of `GET /api/task-status/{job_id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `result` object of a successful status payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobResult {
    pub download_url: String,
}

/// Errors from the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("HTTP error! status: {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was not the JSON shape we expected.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the transport gave up waiting for a response.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Request(e) if e.is_timeout())
    }
}

/// The backend operations the controller depends on.
pub trait JobApi: Send + Sync + 'static {
    /// Queue a processing job.
    fn submit_job(
        &self,
        request: &JobRequest,
    ) -> impl Future<Output = Result<SubmitResponse, ApiError>> + Send;

    /// Fetch the current status of a job.
    fn job_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<StatusPayload, ApiError>> + Send;
}

/// HTTP client for one backend instance.
pub struct HttpJobApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobApi {
    /// * `base_url` - e.g. `http://localhost:8000`, without trailing slash.
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (the GUI shares one with
    /// thumbnail fetching).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn submit_url(&self) -> String {
        format!("{}/api/process-video", self.base_url)
    }

    pub fn status_url(&self, job_id: &str) -> String {
        format!("{}/api/task-status/{}", self.base_url, job_id)
    }

    // ---- private helpers ----

    /// Turn non-2xx into [`ApiError::Status`], otherwise decode the body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl JobApi for HttpJobApi {
    async fn submit_job(&self, request: &JobRequest) -> Result<SubmitResponse, ApiError> {
        let response = self
            .client
            .post(self.submit_url())
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusPayload, ApiError> {
        let response = self.client.get(self.status_url(job_id)).send().await?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls() {
        let api = HttpJobApi::new("http://localhost:8000".into());
        assert_eq!(api.submit_url(), "http://localhost:8000/api/process-video");
        assert_eq!(api.status_url("j1"), "http://localhost:8000/api/task-status/j1");
    }

    #[test]
    fn status_payload_tolerates_missing_fields() {
        let p: StatusPayload = serde_json::from_str(r#"{"status":"PENDING"}"#).unwrap();
        assert_eq!(p.status, "PENDING");
        assert!(p.progress.is_none() && p.result.is_none() && p.message.is_none());

        let p: StatusPayload = serde_json::from_str(
            r#"{"status":"SUCCESS","progress":100,"result":{"download_url":"https://x/y.mp3"}}"#,
        )
        .unwrap();
        assert_eq!(p.progress, Some(100.0));
        assert_eq!(p.result.unwrap().download_url, "https://x/y.mp3");
    }

    #[test]
    fn status_error_message_mentions_code() {
        let err = ApiError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500: boom");
        assert!(!err.is_timeout());
    }
}
