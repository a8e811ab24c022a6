//! Job handler abstraction for processing queued embedding work.
//!
//! The worker claims jobs, hands them to a [`JobHandler`] wrapped in a
//! [`JobContext`], and records the outcome. Handlers do the work; they
//! never touch queue state directly.

use async_trait::async_trait;
use noteworks_core::EmbeddingJob;
use uuid::Uuid;

/// Context provided to job handlers during execution.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// The claimed job being processed.
    pub job: EmbeddingJob,
}

impl JobContext {
    /// Create a new job context.
    pub fn new(job: EmbeddingJob) -> Self {
        Self { job }
    }

    /// Get the job ID.
    pub fn job_id(&self) -> Uuid {
        self.job.id
    }

    /// Get the note this job recomputes the embedding for.
    pub fn note_id(&self) -> Uuid {
        self.job.note_id
    }

    /// Number of times this job has previously failed and been requeued.
    pub fn retry_count(&self) -> i32 {
        self.job.retry_count
    }
}

/// Outcome of a handler invocation.
///
/// Both failure variants route through the queue's failure path, which
/// requeues the job until its retry budget is exhausted. `Retry` signals
/// a transient error; `Failed` signals one unlikely to clear on its own.
#[derive(Debug, Clone)]
pub enum JobResult {
    /// Job completed successfully.
    Success,
    /// Job failed with an error message.
    Failed(String),
    /// Job hit a transient error and wants another attempt.
    Retry(String),
}

/// Trait for implementing job handlers.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Execute the job.
    async fn execute(&self, context: JobContext) -> JobResult;
}

/// A handler that does nothing and always succeeds. Useful for worker tests.
pub struct NoOpHandler;

impl NoOpHandler {
    /// Create a new no-op handler.
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobHandler for NoOpHandler {
    async fn execute(&self, _context: JobContext) -> JobResult {
        JobResult::Success
    }
}
