//! Embedding recompute handler.
//!
//! Loads the note, derives its search text, and stores a fresh vector
//! produced by the configured embedding backend. The stored row records
//! the exact text that was embedded, which is how retrieval later tells
//! fresh vectors from stale ones.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use noteworks_core::{EmbeddingBackend, EmbeddingRepository, NoteRepository};
use noteworks_db::Database;

use crate::handler::{JobContext, JobHandler, JobResult};

/// Handler that recomputes the stored embedding for one note.
pub struct EmbeddingJobHandler {
    db: Database,
    backend: Arc<dyn EmbeddingBackend>,
}

impl EmbeddingJobHandler {
    /// Create a new handler backed by the given database and embedding backend.
    pub fn new(db: Database, backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { db, backend }
    }
}

#[async_trait]
impl JobHandler for EmbeddingJobHandler {
    #[instrument(skip(self, context), fields(
        subsystem = "jobs",
        component = "embed",
        op = "execute",
        job_id = %context.job_id(),
        note_id = %context.note_id(),
    ))]
    async fn execute(&self, context: JobContext) -> JobResult {
        let note_id = context.note_id();

        let note = match self.db.notes.get(note_id).await {
            Ok(note) => note,
            Err(e) if e.is_not_found() => {
                // Deleted between queueing and execution; nothing to embed.
                debug!("Note no longer exists, skipping");
                return JobResult::Success;
            }
            Err(e) => return JobResult::Retry(format!("failed to load note: {e}")),
        };

        let search_text = note.search_text();
        if search_text.trim().is_empty() {
            // No embeddable content; drop any stored vector.
            return match self.db.embeddings.delete_for_note(note_id).await {
                Ok(()) => JobResult::Success,
                Err(e) => JobResult::Retry(format!("failed to clear embedding: {e}")),
            };
        }

        let vectors = match self.backend.embed_texts(&[search_text.clone()]).await {
            Ok(vectors) => vectors,
            Err(e) => return JobResult::Retry(format!("embedding failed: {e}")),
        };
        let Some(vector) = vectors.into_iter().next() else {
            return JobResult::Retry("backend returned no vector".to_string());
        };

        if let Err(e) = self
            .db
            .embeddings
            .store(note_id, vector, self.backend.model_name(), &search_text)
            .await
        {
            return JobResult::Retry(format!("failed to store embedding: {e}"));
        }

        debug!(model = self.backend.model_name(), "Embedding stored");
        JobResult::Success
    }
}
