//! Scripted stand-in for the processing backend.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use yt_processor::api::{ApiError, JobApi, JobResult, StatusPayload, SubmitResponse};
use yt_processor::model::{JobRequest, Snapshot};

pub const URL: &str = "https://youtube.com/watch?v=abc";

/// How the fake answers one submission.
pub enum SubmitReply {
    Accept(String),
    AcceptAfter(Duration, String),
    Fail(u16),
    Hang,
}

/// How the fake answers one status request.
#[derive(Clone)]
pub enum StatusReply {
    Payload(StatusPayload),
    After(Duration, StatusPayload),
    Fail(u16),
}

/// Backend whose answers are queued up front. The last status reply of a
/// job repeats forever, so a poll loop that keeps running shows up in the
/// call counts.
#[derive(Default)]
pub struct FakeApi {
    submits: Mutex<VecDeque<SubmitReply>>,
    statuses: Mutex<HashMap<String, VecDeque<StatusReply>>>,
    submitted: Mutex<Vec<JobRequest>>,
    status_calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit_reply(self, reply: SubmitReply) -> Self {
        self.submits.lock().unwrap().push_back(reply);
        self
    }

    pub fn accept(self, job_id: &str) -> Self {
        self.submit_reply(SubmitReply::Accept(job_id.to_string()))
    }

    pub fn statuses(self, job_id: &str, replies: impl IntoIterator<Item = StatusReply>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn submitted(&self) -> Vec<JobRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn status_call_times(&self, job_id: &str) -> Vec<Instant> {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == job_id)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn status_call_count(&self, job_id: &str) -> usize {
        self.status_call_times(job_id).len()
    }

    pub fn total_status_calls(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    fn next_status(&self, job_id: &str) -> Option<StatusReply> {
        let mut statuses = self.statuses.lock().unwrap();
        let queue = statuses.get_mut(job_id)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl JobApi for FakeApi {
    async fn submit_job(&self, request: &JobRequest) -> Result<SubmitResponse, ApiError> {
        self.submitted.lock().unwrap().push(request.clone());
        let reply = self.submits.lock().unwrap().pop_front().unwrap_or(SubmitReply::Hang);

        match reply {
            SubmitReply::Accept(job_id) => Ok(SubmitResponse { job_id }),
            SubmitReply::AcceptAfter(delay, job_id) => {
                tokio::time::sleep(delay).await;
                Ok(SubmitResponse { job_id })
            }
            SubmitReply::Fail(status) => Err(ApiError::Status {
                status,
                body: "backend unavailable".to_string(),
            }),
            SubmitReply::Hang => std::future::pending().await,
        }
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusPayload, ApiError> {
        self.status_calls
            .lock()
            .unwrap()
            .push((job_id.to_string(), Instant::now()));

        match self.next_status(job_id) {
            Some(StatusReply::Payload(p)) => Ok(p),
            Some(StatusReply::After(delay, p)) => {
                tokio::time::sleep(delay).await;
                Ok(p)
            }
            Some(StatusReply::Fail(status)) => Err(ApiError::Status {
                status,
                body: "bad gateway".to_string(),
            }),
            None => std::future::pending().await,
        }
    }
}

pub fn payload(status: &str, progress: Option<f64>) -> StatusPayload {
    StatusPayload {
        status: status.to_string(),
        progress,
        result: None,
        message: None,
    }
}

pub fn processing(progress: f64) -> StatusReply {
    StatusReply::Payload(payload("PROCESSING", Some(progress)))
}

pub fn success(download_url: &str) -> StatusReply {
    StatusReply::Payload(StatusPayload {
        result: Some(JobResult {
            download_url: download_url.to_string(),
        }),
        ..payload("SUCCESS", None)
    })
}

pub fn failed(message: &str) -> StatusReply {
    StatusReply::Payload(StatusPayload {
        message: Some(message.to_string()),
        ..payload("ERROR", None)
    })
}

/// Wait until a published snapshot satisfies `pred`. Panics instead of
/// hanging if that never happens.
pub async fn wait_until(
    rx: &mut watch::Receiver<Snapshot>,
    pred: impl FnMut(&Snapshot) -> bool,
) -> Snapshot {
    let snap = tokio::time::timeout(Duration::from_secs(3600), rx.wait_for(pred))
        .await
        .expect("snapshot condition never reached")
        .expect("controller dropped");
    Snapshot::clone(&snap)
}
