//! Tracks background bulk-validation jobs.
//!
//! - `JobsState`: clonable shared state holding every job's status and the
//!   finished batches. Injected into the Actix application in `main.rs` and
//!   shared by the `/api/files` handlers.
//!
//! - `JobUpdate`: a status change sent by a running job. Jobs never write the
//!   status map themselves; they push updates into the channel so the order
//!   in which a job reports is the order in which clients observe it.
//!
//! - `start_job_updater`: the single task that applies `JobUpdate`s to the
//!   status map. It also keeps the list of finished jobs and evicts the
//!   oldest ones (status and batch) once more than `retain_finished` have
//!   finished, so the service holds a bounded number of processed files.

use crate::files::FileFormat;
use common::jobs::JobStatus;
use common::model::batch::ProcessedBatch;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// A finished bulk run kept for result lookups and downloads.
#[derive(Debug, Clone)]
pub struct StoredBatch {
    /// Name of the uploaded file, used to build the download name.
    pub file_name: String,
    /// Format of the upload; downloads are written in the same format.
    pub format: FileFormat,
    /// Hex MD5 of the uploaded bytes. A later upload with the same digest
    /// and format reuses this batch instead of validating again.
    pub file_md5: String,
    pub batch: ProcessedBatch,
}

#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status.
    ///
    /// Written by the handler that registers a new job (always `Pending`)
    /// and afterwards only by `start_job_updater`.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    /// Job id to finished batch. A job stores its batch before reporting
    /// `Completed`, so a completed status always has a batch behind it
    /// until the job is evicted.
    pub results: Arc<RwLock<HashMap<String, StoredBatch>>>,
    /// Sender side of the status channel used by running jobs.
    pub tx: mpsc::Sender<JobUpdate>,
    /// How many finished jobs are kept before the oldest is evicted.
    pub retain_finished: usize,
}

impl JobsState {
    /// Creates the state together with the receiver that `start_job_updater`
    /// consumes.
    pub fn new(buffer: usize, retain_finished: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            results: Arc::new(RwLock::new(HashMap::new())),
            tx,
            retain_finished: retain_finished.max(1),
        };
        (state, rx)
    }

    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    pub async fn store_result(&self, job_id: &str, stored: StoredBatch) {
        self.results
            .write()
            .await
            .insert(job_id.to_string(), stored);
    }

    pub async fn result(&self, job_id: &str) -> Option<StoredBatch> {
        self.results.read().await.get(job_id).cloned()
    }

    /// Id of a finished job over the same bytes in the same format whose
    /// numbers all validated. Batches with upstream failures are never
    /// reused so a new upload retries them.
    pub async fn reusable_job(&self, file_md5: &str, format: FileFormat) -> Option<String> {
        self.results
            .read()
            .await
            .iter()
            .find(|(_, stored)| {
                stored.file_md5 == file_md5
                    && stored.format == format
                    && stored.batch.failed_validations == 0
            })
            .map(|(job_id, _)| job_id.clone())
    }

    async fn evict(&self, job_id: &str) {
        self.jobs.write().await.remove(job_id);
        self.results.write().await.remove(job_id);
        debug!("Evicted finished job {}", job_id);
    }
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
        }
    }
}

/// Applies status updates until every sender is dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    let mut finished: VecDeque<String> = VecDeque::new();
    while let Some(update) = rx.recv().await {
        let is_finished = update.status.is_finished();
        {
            let mut jobs = state.jobs.write().await;
            jobs.insert(update.job_id.clone(), update.status);
        }

        if is_finished && !finished.contains(&update.job_id) {
            finished.push_back(update.job_id);
            while finished.len() > state.retain_finished {
                if let Some(oldest) = finished.pop_front() {
                    state.evict(&oldest).await;
                }
            }
        }
    }
}
