//! Errors surfaced to whoever renders the controller's snapshots.

/// Why a job attempt ended without a result.
///
/// None of these are retried automatically; the user resubmits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The URL field was empty, nothing was sent.
    #[error("Please enter a video URL")]
    EmptyUrl,

    /// No response to the submission within the configured ceiling.
    #[error("Error: request timed out after {secs} seconds")]
    SubmissionTimeout { secs: u64 },

    /// The submission request failed (HTTP status, network, bad body).
    #[error("Error: {0}")]
    SubmissionFailed(String),

    /// The backend reported the job as failed. Shown verbatim.
    #[error("{0}")]
    JobFailed(String),

    /// A newer submission started before this one got its response.
    #[error("submission superseded by a newer one")]
    Superseded,
}
