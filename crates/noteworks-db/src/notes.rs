//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use noteworks_core::{
    new_v7, normalize_tags, CandidateNote, CreateNoteRequest, Error, Note, NoteEmbedding,
    NoteField, NoteRepository, NoteType, Result, RetrievalPlan, TagPredicate, UpdateNoteRequest,
};

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Convert NoteType to string for database.
    pub(crate) fn note_type_to_str(note_type: NoteType) -> &'static str {
        match note_type {
            NoteType::Content => "content",
            NoteType::Chat => "chat",
            NoteType::Template => "template",
        }
    }

    /// Convert string from database to NoteType.
    pub(crate) fn str_to_note_type(s: &str) -> NoteType {
        match s {
            "content" => NoteType::Content,
            "chat" => NoteType::Chat,
            "template" => NoteType::Template,
            _ => NoteType::Content, // fallback
        }
    }

    /// Parse a note row into a Note struct.
    ///
    /// Expects the standard projection columns plus an aggregated `tags`
    /// text array.
    fn parse_note_row(row: &sqlx::postgres::PgRow) -> Result<Note> {
        let fields_json: serde_json::Value = row.get("fields");
        let fields: Vec<NoteField> = serde_json::from_value(fields_json)?;
        let note_type: String = row.get("note_type");

        Ok(Note {
            id: row.get("id"),
            workspace_id: row.get("workspace_id"),
            owner_id: row.get("owner_id"),
            note_type: Self::str_to_note_type(&note_type),
            fields,
            tags: row.get("tags"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Replace the tag rows for a note inside a transaction.
    async fn replace_tags_tx(
        tx: &mut Transaction<'_, Postgres>,
        note_id: Uuid,
        tags: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM note_tag WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        for tag in tags {
            sqlx::query("INSERT INTO note_tag (note_id, tag_name) VALUES ($1, $2)")
                .bind(note_id)
                .bind(tag)
                .execute(&mut **tx)
                .await
                .map_err(Error::Database)?;
        }
        Ok(())
    }
}

// Correlated subquery so the note row count stays one per note.
const TAGS_PROJECTION: &str = "COALESCE(
        (SELECT array_agg(tag_name ORDER BY tag_name) FROM note_tag WHERE note_id = n.id),
        ARRAY[]::text[]
    ) AS tags";

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, request: CreateNoteRequest) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();
        let tags = normalize_tags(request.tags);
        let fields_json = serde_json::to_value(&request.fields)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO note (id, workspace_id, owner_id, note_type, fields, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)",
        )
        .bind(id)
        .bind(request.workspace_id)
        .bind(request.owner_id)
        .bind(Self::note_type_to_str(request.note_type))
        .bind(&fields_json)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        Self::replace_tags_tx(&mut tx, id, &tags).await?;

        tx.commit().await.map_err(Error::Database)?;

        Ok(Note {
            id,
            workspace_id: request.workspace_id,
            owner_id: request.owner_id,
            note_type: request.note_type,
            fields: request.fields,
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Note> {
        let query = format!(
            "SELECT n.id, n.workspace_id, n.owner_id, n.note_type, n.fields,
                    n.created_at, n.updated_at, {TAGS_PROJECTION}
             FROM note n
             WHERE n.id = $1"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;

        Self::parse_note_row(&row)
    }

    async fn update(&self, id: Uuid, request: UpdateNoteRequest) -> Result<Note> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM note WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if exists.is_none() {
            return Err(Error::NoteNotFound(id));
        }

        let mut touched = false;

        if let Some(fields) = &request.fields {
            let fields_json = serde_json::to_value(fields)?;
            sqlx::query("UPDATE note SET fields = $1 WHERE id = $2")
                .bind(&fields_json)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            touched = true;
        }

        if let Some(tags) = request.tags {
            let tags = normalize_tags(tags);
            Self::replace_tags_tx(&mut tx, id, &tags).await?;
            touched = true;
        }

        if touched {
            sqlx::query("UPDATE note SET updated_at = $1 WHERE id = $2")
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        self.get(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Tags, embedding, and queued jobs go via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn find_candidates(&self, plan: &RetrievalPlan) -> Result<Vec<CandidateNote>> {
        // An empty tag selection is unsatisfiable; skip the round trip.
        if plan.tag_predicate.matches_nothing() {
            debug!(
                subsystem = "database",
                component = "notes",
                op = "find_candidates",
                workspace_id = %plan.workspace_id,
                "Empty tag selection, returning no candidates"
            );
            return Ok(Vec::new());
        }

        let tag_clause = match &plan.tag_predicate {
            TagPredicate::Any => "",
            TagPredicate::AnyOf(_) => {
                "AND EXISTS (
                    SELECT 1 FROM note_tag t
                    WHERE t.note_id = n.id AND t.tag_name = ANY($3)
                )"
            }
        };

        let query = format!(
            "SELECT n.id, n.workspace_id, n.owner_id, n.note_type, n.fields,
                    n.created_at, n.updated_at, {TAGS_PROJECTION},
                    e.vector, e.model, e.search_text, e.generated_at
             FROM note n
             LEFT JOIN note_embedding e ON e.note_id = n.id
             WHERE n.workspace_id = $1
               AND n.note_type = $2
               {tag_clause}
             ORDER BY n.created_at DESC, n.id DESC"
        );

        let mut q = sqlx::query(&query)
            .bind(plan.workspace_id)
            .bind(Self::note_type_to_str(plan.note_type));
        if let TagPredicate::AnyOf(tags) = &plan.tag_predicate {
            q = q.bind(tags);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(Error::Database)?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let note = Self::parse_note_row(&row)?;
            let vector: Option<Vector> = row.get("vector");
            let embedding = vector.map(|vector| NoteEmbedding {
                note_id: note.id,
                vector,
                model: row.get("model"),
                search_text: row.get("search_text"),
                generated_at: row.get("generated_at"),
            });
            candidates.push(CandidateNote { note, embedding });
        }

        debug!(
            subsystem = "database",
            component = "notes",
            op = "find_candidates",
            workspace_id = %plan.workspace_id,
            note_type = %plan.note_type,
            candidate_count = candidates.len(),
            "Selected retrieval candidates"
        );

        Ok(candidates)
    }
}
