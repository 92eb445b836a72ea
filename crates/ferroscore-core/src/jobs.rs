//! Background execution of long scoring/fetch jobs.
//!
//! [`JobRegistry`] is the polling surface: it is created once at startup
//! and shared with whatever exposes job status. [`WorkerPool`] runs jobs on
//! a fixed set of threads fed by a bounded queue; submissions beyond the
//! queue capacity are rejected rather than spawning more threads.

use std::collections::HashMap;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::JobPoolConfig;
use crate::domain::format_rfc3339;

pub type JobId = Uuid;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("worker pool is shut down")]
    ShutDown,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Externally visible job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
enum JobState {
    Running,
    Completed(Value),
    Failed(String),
}

#[derive(Debug)]
struct JobEntry {
    name: String,
    state: JobState,
    submitted_at: OffsetDateTime,
    finished_at: Option<Instant>,
}

/// Point-in-time view of a job, as returned to pollers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub name: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitted_at: String,
}

/// Thread-safe registry of submitted jobs and their outcomes.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, JobEntry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: JobId) -> Option<JobSnapshot> {
        let jobs = self.lock();
        let entry = jobs.get(&id)?;
        let (status, result, error) = match &entry.state {
            JobState::Running => (JobStatus::Running, None, None),
            JobState::Completed(value) => (JobStatus::Completed, Some(value.clone()), None),
            JobState::Failed(message) => (JobStatus::Failed, None, Some(message.clone())),
        };
        Some(JobSnapshot {
            id,
            name: entry.name.clone(),
            status,
            result,
            error,
            submitted_at: format_rfc3339(entry.submitted_at),
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops finished jobs whose outcome is older than `older_than`.
    pub fn prune_finished(&self, older_than: Duration) -> usize {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|_, entry| {
            entry
                .finished_at
                .map_or(true, |finished| finished.elapsed() < older_than)
        });
        before - jobs.len()
    }

    fn register(&self, name: &str) -> JobId {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            JobEntry {
                name: name.to_owned(),
                state: JobState::Running,
                submitted_at: OffsetDateTime::now_utc(),
                finished_at: None,
            },
        );
        id
    }

    fn forget(&self, id: JobId) {
        self.lock().remove(&id);
    }

    /// Records the outcome. A job's outcome is written at most once.
    fn finish(&self, id: JobId, outcome: Result<Value, String>) {
        let mut jobs = self.lock();
        if let Some(entry) = jobs.get_mut(&id) {
            if entry.state != JobState::Running {
                return;
            }
            entry.state = match outcome {
                Ok(value) => JobState::Completed(value),
                Err(message) => JobState::Failed(message),
            };
            entry.finished_at = Some(Instant::now());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, JobEntry>> {
        self.jobs
            .lock()
            .expect("job registry lock should not be poisoned")
    }
}

type JobFn = Box<dyn FnOnce() -> Result<Value, String> + Send + 'static>;

struct Task {
    id: JobId,
    name: String,
    run: JobFn,
}

/// Fixed-size pool of worker threads with a bounded submission queue.
pub struct WorkerPool {
    registry: Arc<JobRegistry>,
    sender: Option<SyncSender<Task>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(registry: Arc<JobRegistry>, config: JobPoolConfig) -> Result<Self, JobError> {
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = mpsc::sync_channel::<Task>(capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..config.workers.max(1))
            .map(|index| {
                let receiver = Arc::clone(&receiver);
                let registry = Arc::clone(&registry);
                thread::Builder::new()
                    .name(format!("ferroscore-worker-{index}"))
                    .spawn(move || worker_loop(&receiver, &registry))
                    .map_err(JobError::Spawn)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            registry,
            sender: Some(sender),
            workers,
            capacity,
        })
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues `job` and returns its id; the job's `Ok` value is stored as JSON.
    pub fn submit<F, T, E>(&self, name: &str, job: F) -> Result<JobId, JobError>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Serialize,
        E: Display,
    {
        let sender = self.sender.as_ref().ok_or(JobError::ShutDown)?;
        let id = self.registry.register(name);
        let run: JobFn = Box::new(move || match job() {
            Ok(value) => serde_json::to_value(value)
                .map_err(|error| format!("failed to serialize job result: {error}")),
            Err(error) => Err(error.to_string()),
        });

        match sender.try_send(Task {
            id,
            name: name.to_owned(),
            run,
        }) {
            Ok(()) => {
                info!(job_id = %id, job = name, "job submitted");
                Ok(id)
            }
            Err(TrySendError::Full(_)) => {
                self.registry.forget(id);
                warn!(job = name, capacity = self.capacity, "job queue full, rejecting");
                Err(JobError::QueueFull {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.registry.forget(id);
                Err(JobError::ShutDown)
            }
        }
    }

    /// Closes the queue, lets workers drain it, and joins them.
    pub fn shutdown(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Task>>, registry: &JobRegistry) {
    loop {
        let task = {
            let receiver = match receiver.lock() {
                Ok(receiver) => receiver,
                Err(_) => return,
            };
            match receiver.recv() {
                Ok(task) => task,
                Err(_) => return,
            }
        };

        let Task { id, name, run } = task;
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(run))
            .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));

        match &outcome {
            Ok(_) => info!(
                job_id = %id,
                job = %name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "job completed"
            ),
            Err(error) => warn!(job_id = %id, job = %name, %error, "job failed"),
        }
        registry.finish(id, outcome);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("job panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("job panicked: {message}")
    } else {
        String::from("job panicked")
    }
}
