//! Embedding repository implementation.
//!
//! Each note carries at most one embedding row. Writes are upserts keyed
//! on the note ID, so a recompute replaces the previous vector atomically.

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noteworks_core::{EmbeddingRepository, Error, NoteEmbedding, Result};

/// PostgreSQL implementation of EmbeddingRepository.
#[derive(Clone)]
pub struct PgEmbeddingRepository {
    pool: Pool<Postgres>,
}

impl PgEmbeddingRepository {
    /// Create a new PgEmbeddingRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmbeddingRepository for PgEmbeddingRepository {
    async fn store(
        &self,
        note_id: Uuid,
        vector: Vector,
        model: &str,
        search_text: &str,
    ) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO note_embedding (note_id, vector, model, search_text, generated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (note_id) DO UPDATE SET
                 vector = EXCLUDED.vector,
                 model = EXCLUDED.model,
                 search_text = EXCLUDED.search_text,
                 generated_at = EXCLUDED.generated_at",
        )
        .bind(note_id)
        .bind(&vector)
        .bind(model)
        .bind(search_text)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn get_for_note(&self, note_id: Uuid) -> Result<Option<NoteEmbedding>> {
        let row = sqlx::query(
            "SELECT note_id, vector, model, search_text, generated_at
             FROM note_embedding
             WHERE note_id = $1",
        )
        .bind(note_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| NoteEmbedding {
            note_id: row.get("note_id"),
            vector: row.get("vector"),
            model: row.get("model"),
            search_text: row.get("search_text"),
            generated_at: row.get("generated_at"),
        }))
    }

    async fn delete_for_note(&self, note_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM note_embedding WHERE note_id = $1")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
