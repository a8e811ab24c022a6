//! # noteworks-jobs
//!
//! Background embedding queue worker for noteworks.
//!
//! This crate provides:
//! - A poll-and-notify worker loop that drains the embedding job queue
//! - An embedding recompute handler that keeps stored vectors in sync
//!   with note content
//! - Retry-aware failure handling backed by the queue repository
//! - Job lifecycle events published to the shared event bus
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use noteworks_db::Database;
//! use noteworks_inference::OpenAIBackend;
//! use noteworks_jobs::{EmbeddingJobHandler, JobWorker, WorkerConfig};
//!
//! let db = Database::connect("postgres://...").await?;
//! let backend = Arc::new(OpenAIBackend::from_env()?);
//! let handler = Arc::new(EmbeddingJobHandler::new(db.clone(), backend));
//!
//! let handle = JobWorker::new(db, handler)
//!     .with_config(WorkerConfig::from_env())
//!     .start();
//!
//! // Graceful shutdown
//! handle.shutdown().await?;
//! ```

pub mod embed;
pub mod handler;
pub mod worker;

// Re-export core types
pub use noteworks_core::*;

pub use embed::EmbeddingJobHandler;
pub use handler::{JobContext, JobHandler, JobResult, NoOpHandler};
pub use worker::{JobWorker, WorkerConfig, WorkerHandle};

/// Default maximum retries for failed jobs.
pub const DEFAULT_MAX_RETRIES: i32 = noteworks_core::defaults::JOB_MAX_RETRIES;

/// Default polling interval for job processing (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = noteworks_core::defaults::JOB_POLL_INTERVAL_MS;
