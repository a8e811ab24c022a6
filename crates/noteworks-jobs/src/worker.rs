//! Background worker that drains the embedding job queue.
//!
//! The worker claims pending jobs one at a time (oldest first, using the
//! repository's SKIP LOCKED claim so multiple workers never collide) and
//! runs them through a [`JobHandler`]. When the queue is empty it sleeps
//! until a queue notification, the poll tick, or shutdown wakes it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use noteworks_core::defaults::JOB_POLL_INTERVAL_MS;
use noteworks_core::{EmbeddingJob, EventBus, JobRepository, ServerEvent};
use noteworks_db::Database;

use crate::handler::{JobContext, JobHandler, JobResult};

/// Configuration for the job worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Fallback poll interval in milliseconds. Queue notifications wake the
    /// worker immediately; this bounds the wait when a notification is lost.
    pub poll_interval_ms: u64,
    /// Whether the worker loop runs at all.
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: JOB_POLL_INTERVAL_MS,
            enabled: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOB_POLL_INTERVAL_MS` | `1000` | Fallback poll interval in milliseconds |
    /// | `JOB_WORKER_ENABLED` | `true` | Set to `false` or `0` to disable the worker |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let poll_interval_ms = std::env::var("JOB_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.poll_interval_ms);

        let enabled = std::env::var("JOB_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(defaults.enabled);

        Self {
            poll_interval_ms,
            enabled,
        }
    }

    /// Set the fallback poll interval in milliseconds.
    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Enable or disable the worker.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Handle for a running worker, used for graceful shutdown.
pub struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl WorkerHandle {
    /// Signal the worker to stop after the job it is currently processing.
    ///
    /// Returns an error if the worker loop has already exited (for example
    /// when it was started with `enabled = false`).
    pub async fn shutdown(&self) -> Result<(), mpsc::error::SendError<()>> {
        self.shutdown_tx.send(()).await
    }
}

/// Background worker that processes queued embedding jobs.
pub struct JobWorker {
    db: Database,
    handler: Arc<dyn JobHandler>,
    config: WorkerConfig,
    events: Option<Arc<EventBus>>,
}

impl JobWorker {
    /// Create a new worker with the given handler and default configuration.
    pub fn new(db: Database, handler: Arc<dyn JobHandler>) -> Self {
        Self {
            db,
            handler,
            config: WorkerConfig::default(),
            events: None,
        }
    }

    /// Replace the worker configuration.
    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an event bus. Job lifecycle events are published to it.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Start the worker loop in a background task, returning a shutdown handle.
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });

        WorkerHandle { shutdown_tx }
    }

    async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!(
                subsystem = "jobs",
                component = "worker",
                "Job worker disabled, not starting"
            );
            return;
        }

        info!(
            subsystem = "jobs",
            component = "worker",
            poll_interval_ms = self.config.poll_interval_ms,
            "Job worker started"
        );

        let notify = self.db.jobs.job_notify();
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match self.claim_next().await {
                Some(job) => self.execute_job(job).await,
                None => {
                    // Idle. Wake on a queue notification, the poll tick,
                    // or a shutdown signal.
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        _ = notify.notified() => {}
                        _ = tokio::time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        info!(
            subsystem = "jobs",
            component = "worker",
            "Job worker stopped"
        );
    }

    async fn claim_next(&self) -> Option<EmbeddingJob> {
        match self.db.jobs.claim_next().await {
            Ok(job) => job,
            Err(e) => {
                error!(
                    subsystem = "jobs",
                    component = "worker",
                    error = %e,
                    "Failed to claim job"
                );
                None
            }
        }
    }

    async fn execute_job(&self, job: EmbeddingJob) {
        let job_id = job.id;
        let note_id = job.note_id;
        let start = Instant::now();

        info!(
            subsystem = "jobs",
            component = "worker",
            %job_id,
            %note_id,
            retry_count = job.retry_count,
            "Processing job"
        );
        self.emit(ServerEvent::JobStarted { job_id, note_id });

        let result = self.handler.execute(JobContext::new(job)).await;
        let duration_ms = start.elapsed().as_millis() as i64;

        match result {
            JobResult::Success => {
                if let Err(e) = self.db.jobs.complete(job_id).await {
                    error!(
                        subsystem = "jobs",
                        component = "worker",
                        error = %e,
                        %job_id,
                        "Failed to mark job completed"
                    );
                    return;
                }
                info!(
                    subsystem = "jobs",
                    component = "worker",
                    %job_id,
                    duration_ms,
                    "Job completed"
                );
                self.emit(ServerEvent::JobCompleted {
                    job_id,
                    note_id,
                    duration_ms: Some(duration_ms),
                });
            }
            JobResult::Failed(error) | JobResult::Retry(error) => {
                // The repository requeues below the retry budget and marks
                // the job failed once it is exhausted.
                if let Err(e) = self.db.jobs.fail(job_id, &error).await {
                    error!(
                        subsystem = "jobs",
                        component = "worker",
                        error = %e,
                        %job_id,
                        "Failed to record job failure"
                    );
                    return;
                }
                warn!(
                    subsystem = "jobs",
                    component = "worker",
                    %job_id,
                    error = %error,
                    duration_ms,
                    "Job failed"
                );
                self.emit(ServerEvent::JobFailed {
                    job_id,
                    note_id,
                    error,
                });
            }
        }
    }

    fn emit(&self, event: ServerEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}
