use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::StatusPayload;
use crate::error::JobError;
use crate::progress::normalize_progress;

/// Output format requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Keep the video track
    #[default]
    Video,
    /// Audio only
    Audio,
}

impl MediaType {
    /// Every option, in the order the form lists them
    pub const ALL: [MediaType; 2] = [MediaType::Video, MediaType::Audio];

    /// Human-readable label for the combo box
    pub fn label(self) -> &'static str {
        match self {
            MediaType::Video => "Video",
            MediaType::Audio => "Audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Video => f.write_str("video"),
            MediaType::Audio => f.write_str("audio"),
        }
    }
}

/// Body of one submission; built fresh for every submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// Video URL as typed by the user, trimmed
    pub url: String,
    /// Requested output format
    pub media_type: MediaType,
}

impl JobRequest {
    /// Trims the URL and rejects an empty one. Anything else is left for
    /// the backend to judge.
    pub fn new(url: &str, media_type: MediaType) -> Result<Self, JobError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(JobError::EmptyUrl);
        }
        Ok(Self {
            url: url.to_string(),
            media_type,
        })
    }
}

/// Identifies the job being polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Backend-assigned job identifier
    pub job_id: String,
}

/// Lifecycle state reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Starting,
    Processing,
    Success,
    Error,
    /// A value this client does not know; polling continues
    Other(String),
}

impl JobState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => JobState::Pending,
            "STARTING" => JobState::Starting,
            "PROCESSING" => JobState::Processing,
            "SUCCESS" => JobState::Success,
            "ERROR" => JobState::Error,
            other => JobState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Starting => "STARTING",
            JobState::Processing => "PROCESSING",
            JobState::Success => "SUCCESS",
            JobState::Error => "ERROR",
            JobState::Other(raw) => raw,
        }
    }

    /// `SUCCESS` and `ERROR` end polling for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known status of a job. Each poll replaces it entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    /// Current lifecycle state
    pub state: JobState,
    /// Progress percentage (0.0 to 100.0)
    pub progress: f32,
    /// Where the processed media can be fetched, once `SUCCESS`
    pub result_url: Option<String>,
    /// Backend message, once `ERROR`
    pub error_message: Option<String>,
}

impl JobStatus {
    /// Builds a status from one payload.
    ///
    /// A `SUCCESS` without a usable download URL is turned into an `ERROR`
    /// so a terminal success always carries a result location, and an
    /// `ERROR` always carries a non-empty message.
    pub fn from_payload(payload: StatusPayload) -> Self {
        let state = JobState::parse(&payload.status);
        let progress = normalize_progress(payload.progress);
        let result_url = payload
            .result
            .map(|r| r.download_url)
            .filter(|u| !u.trim().is_empty());
        let message = payload.message.filter(|m| !m.trim().is_empty());

        match state {
            JobState::Success if result_url.is_none() => Self {
                state: JobState::Error,
                progress,
                result_url: None,
                error_message: Some("Job finished without a download URL".to_string()),
            },
            JobState::Success => Self {
                state,
                progress,
                result_url,
                error_message: None,
            },
            JobState::Error => Self {
                state,
                progress,
                result_url: None,
                error_message: Some(message.unwrap_or_else(|| "Job failed".to_string())),
            },
            _ => Self {
                state,
                progress,
                result_url: None,
                error_message: None,
            },
        }
    }
}

/// Read-only view handed to the presentation layer after every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Job being tracked, if a submission succeeded
    pub job_id: Option<String>,
    /// Latest state; `None` before the first submit or after a failed one
    pub status: Option<JobState>,
    /// Progress percentage (0.0 to 100.0)
    pub progress: f32,
    /// Result location once the job succeeded
    pub download_url: Option<String>,
    /// Error to show in the banner
    pub error: Option<JobError>,
    /// Whether a poll loop is running
    pub polling: bool,
}

impl Snapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.as_ref().is_some_and(JobState::is_terminal)
    }
}
