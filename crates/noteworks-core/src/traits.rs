//! Core trait definitions for storage and inference backends.
//!
//! These traits are the seams of the system: handlers and the retrieval
//! engine depend on them rather than on concrete Postgres or HTTP clients,
//! so tests can substitute in-memory or mock implementations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    CreateNoteRequest, EmbeddingJob, Note, NoteEmbedding, QueueStats, UpdateNoteRequest, Vector,
};
use crate::search::{CandidateNote, RetrievalPlan};

// =============================================================================
// NOTE STORAGE
// =============================================================================

/// Note persistence operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a note with its tags.
    async fn create(&self, request: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID, tags included.
    ///
    /// Returns [`Error::NoteNotFound`](crate::Error::NoteNotFound) when the
    /// note does not exist.
    async fn get(&self, id: Uuid) -> Result<Note>;

    /// Apply a partial update. `None` fields are left untouched.
    async fn update(&self, id: Uuid, request: UpdateNoteRequest) -> Result<Note>;

    /// Delete a note. Tags, embedding, and queued jobs go with it.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Select structurally-eligible candidates for a retrieval plan.
    ///
    /// Applies workspace, note type, and tag filtering in storage and
    /// returns each candidate joined with its stored embedding, if any.
    /// An unsatisfiable tag predicate yields an empty list without a
    /// round trip.
    async fn find_candidates(&self, plan: &RetrievalPlan) -> Result<Vec<CandidateNote>>;
}

// =============================================================================
// EMBEDDING STORAGE
// =============================================================================

/// Persistence for note embeddings.
#[async_trait]
pub trait EmbeddingRepository: Send + Sync {
    /// Store or replace the embedding for a note.
    ///
    /// `search_text` records the exact text the vector was generated from;
    /// retrieval compares it against the note's current derivation to
    /// detect staleness.
    async fn store(
        &self,
        note_id: Uuid,
        vector: Vector,
        model: &str,
        search_text: &str,
    ) -> Result<()>;

    /// Fetch the stored embedding for a note, if one exists.
    async fn get_for_note(&self, note_id: Uuid) -> Result<Option<NoteEmbedding>>;

    /// Remove the stored embedding for a note, if one exists.
    async fn delete_for_note(&self, note_id: Uuid) -> Result<()>;
}

// =============================================================================
// JOB QUEUE
// =============================================================================

/// Persistence and queue operations for embedding recompute jobs.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Queue an embedding job for a note unless one is already pending or
    /// running for it.
    ///
    /// Returns the new job ID, or `None` when deduplication suppressed the
    /// insert.
    async fn queue_deduplicated(&self, note_id: Uuid) -> Result<Option<Uuid>>;

    /// Claim the oldest pending job, marking it running.
    ///
    /// Safe to call from concurrent workers; each job is claimed at most
    /// once. Returns `None` when the queue is empty.
    async fn claim_next(&self) -> Result<Option<EmbeddingJob>>;

    /// Mark a job completed.
    async fn complete(&self, job_id: Uuid) -> Result<()>;

    /// Record a failure.
    ///
    /// While the job has retries left it goes back to pending with the
    /// retry count bumped; otherwise it is marked failed terminally.
    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()>;

    /// Fetch a job by ID.
    async fn get(&self, job_id: Uuid) -> Result<Option<EmbeddingJob>>;

    /// Number of jobs currently pending.
    async fn pending_count(&self) -> Result<i64>;

    /// Aggregate queue statistics.
    async fn queue_stats(&self) -> Result<QueueStats>;
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Embedding provider backend.
///
/// Implementations perform a single provider call per invocation and
/// surface failures as errors; retry policy lives in the job queue, not
/// here.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for a batch of texts.
    ///
    /// Returns one vector per input, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Dimensionality of the vectors this backend produces.
    fn dimension(&self) -> usize;

    /// Model identifier recorded alongside stored embeddings.
    fn model_name(&self) -> &str;
}
