//! Job submission and status polling.
//!
//! [`JobController`] owns at most one job at a time. [`JobController::submit`]
//! sends the request and, once the backend hands out a job id, spawns a
//! poll loop that asks for the job status on a fixed cadence until the job
//! reaches `SUCCESS` or `ERROR`.
//!
//! Every change is published as a [`Snapshot`] on a [`watch`] channel.
//!
//! A new `submit` supersedes the current job: its poll loop is cancelled
//! and any response still in flight for it is discarded. Each loop is
//! tagged with the generation and job id it was started for, and the tick
//! handler drops responses whose tag no longer matches.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, JobApi, StatusPayload};
use crate::config::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_SUBMIT_TIMEOUT_SECS};
use crate::error::JobError;
use crate::model::{JobHandle, JobRequest, JobState, JobStatus, MediaType, Snapshot};

/// Timing knobs for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay before the first poll and between polls. Must be non-zero.
    pub poll_interval: Duration,
    /// Submission requests not answered within this are abandoned.
    pub submit_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            submit_timeout: Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
        }
    }
}

/// What the tick handler did with one status payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Applied, job still running.
    Continue,
    /// Applied, job reached a terminal state.
    Terminal,
    /// Dropped: wrong job, superseded, or already terminal.
    Stale,
}

/// Drives one job from submission to a terminal state.
pub struct JobController<A: JobApi> {
    api: Arc<A>,
    settings: PollSettings,
    shared: Arc<Shared>,
}

/// State shared between the controller and its poll loop.
struct Shared {
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<Snapshot>,
}

#[derive(Default)]
struct Inner {
    /// Bumped by every submit; stale work compares against it.
    generation: u64,
    /// A submission request is in flight.
    submitting: bool,
    handle: Option<JobHandle>,
    latest: Option<JobStatus>,
    error: Option<JobError>,
    poller: Option<Poller>,
}

/// A running poll loop. Dropping it stops the loop.
struct Poller {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl<A: JobApi> JobController<A> {
    pub fn new(api: Arc<A>, settings: PollSettings) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        Self {
            api,
            settings,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                snapshot_tx,
            }),
        }
    }

    /// Current view of the job.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.shared.lock().poller.is_some()
    }

    pub fn active_job(&self) -> Option<JobHandle> {
        self.shared.lock().handle.clone()
    }

    /// Submit a new job and start polling it.
    ///
    /// Any job already tracked is dropped first: its poll loop is stopped
    /// and its status cleared. Must be called from within a Tokio runtime.
    ///
    /// Returns [`JobError::Superseded`] when another `submit` started
    /// while this one was waiting for the backend; that call owns the
    /// visible state from then on.
    pub async fn submit(&self, url: &str, media_type: MediaType) -> Result<JobHandle, JobError> {
        let request = JobRequest::new(url, media_type)?;

        let generation = {
            let mut inner = self.shared.lock();
            inner.generation += 1;
            inner.submitting = true;
            inner.handle = None;
            inner.latest = None;
            inner.error = None;
            inner.poller = None;
            self.shared.publish(&inner);
            inner.generation
        };

        tracing::info!(
            url = %request.url,
            media_type = %request.media_type,
            generation,
            "Submitting job",
        );

        let result =
            tokio::time::timeout(self.settings.submit_timeout, self.api.submit_job(&request)).await;

        let mut inner = self.shared.lock();
        if inner.generation != generation {
            tracing::debug!(generation, "Dropping response of superseded submission");
            return Err(JobError::Superseded);
        }
        inner.submitting = false;

        let outcome = match result {
            Err(_elapsed) => Err(self.timeout_error()),
            Ok(Err(e)) if e.is_timeout() => Err(self.timeout_error()),
            Ok(Err(e)) => Err(JobError::SubmissionFailed(e.to_string())),
            Ok(Ok(response)) if response.job_id.trim().is_empty() => Err(
                JobError::SubmissionFailed("response did not include a job id".to_string()),
            ),
            Ok(Ok(response)) => Ok(JobHandle {
                job_id: response.job_id,
            }),
        };

        match outcome {
            Ok(handle) => {
                tracing::info!(job_id = %handle.job_id, "Job accepted, polling status");
                inner.poller = Some(self.spawn_poller(generation, handle.job_id.clone()));
                inner.handle = Some(handle.clone());
                self.shared.publish(&inner);
                Ok(handle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Job submission failed");
                inner.error = Some(e.clone());
                self.shared.publish(&inner);
                Err(e)
            }
        }
    }

    /// Stop polling without touching the visible status.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        // Late answers for the current generation must not land either.
        inner.generation += 1;
        inner.submitting = false;
        if inner.poller.take().is_some() {
            tracing::debug!("Poll loop stopped");
        }
        self.shared.publish(&inner);
    }

    fn timeout_error(&self) -> JobError {
        JobError::SubmissionTimeout {
            secs: self.settings.submit_timeout.as_secs(),
        }
    }

    fn spawn_poller(&self, generation: u64, job_id: String) -> Poller {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            Arc::clone(&self.shared),
            self.settings.poll_interval,
            generation,
            job_id,
            cancel.clone(),
        ));
        Poller { cancel, task }
    }

    #[cfg(test)]
    pub(crate) fn apply_status(
        &self,
        generation: u64,
        job_id: &str,
        payload: StatusPayload,
    ) -> TickOutcome {
        self.shared.apply_status(generation, job_id, payload)
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.shared.lock().generation
    }
}

impl<A: JobApi> Drop for JobController<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        self.snapshot_tx.send_replace(inner.snapshot());
    }

    /// The tick handler: replace the status of the job tagged by
    /// `generation`/`job_id` with `payload`.
    fn apply_status(&self, generation: u64, job_id: &str, payload: StatusPayload) -> TickOutcome {
        let mut inner = self.lock();

        let current = inner.generation == generation
            && inner.handle.as_ref().is_some_and(|h| h.job_id == job_id);
        let finished = inner
            .latest
            .as_ref()
            .is_some_and(|s| s.state.is_terminal());
        if !current || finished {
            tracing::debug!(job_id, generation, "Discarding stale status response");
            return TickOutcome::Stale;
        }

        let status = JobStatus::from_payload(payload);
        tracing::debug!(job_id, state = %status.state, progress = status.progress, "Job status");

        let outcome = match status.state {
            JobState::Success => {
                tracing::info!(
                    job_id,
                    download_url = status.result_url.as_deref().unwrap_or_default(),
                    "Job finished",
                );
                TickOutcome::Terminal
            }
            JobState::Error => {
                let message = status.error_message.clone().unwrap_or_default();
                tracing::warn!(job_id, error = %message, "Job failed");
                inner.error = Some(JobError::JobFailed(message));
                TickOutcome::Terminal
            }
            _ => TickOutcome::Continue,
        };

        inner.latest = Some(status);
        if outcome == TickOutcome::Terminal {
            inner.poller = None;
        }
        self.publish(&inner);
        outcome
    }
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        let status = match &self.latest {
            Some(latest) => Some(latest.state.clone()),
            None if self.submitting || self.handle.is_some() => Some(JobState::Starting),
            None => None,
        };
        Snapshot {
            job_id: self.handle.as_ref().map(|h| h.job_id.clone()),
            status,
            progress: self.latest.as_ref().map_or(0.0, |s| s.progress),
            download_url: self.latest.as_ref().and_then(|s| s.result_url.clone()),
            error: self.error.clone(),
            polling: self.poller.is_some(),
        }
    }
}

/// Poll `job_id` every `interval` until it is terminal, superseded or
/// cancelled. Only one status request is outstanding at a time.
async fn poll_loop<A: JobApi>(
    api: Arc<A>,
    shared: Arc<Shared>,
    interval: Duration,
    generation: u64,
    job_id: String,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let response: Result<StatusPayload, ApiError> = tokio::select! {
            _ = cancel.cancelled() => break,
            r = api.job_status(&job_id) => r,
        };

        match response {
            Ok(payload) => match shared.apply_status(generation, &job_id, payload) {
                TickOutcome::Continue => {}
                TickOutcome::Terminal | TickOutcome::Stale => break,
            },
            Err(e) => {
                // Transient: keep the last status and try again next tick.
                tracing::warn!(job_id = %job_id, error = %e, "Error checking status");
            }
        }
    }

    tracing::debug!(job_id = %job_id, generation, "Poll loop exited");
}
