//! Core data models for noteworks.
//!
//! These types are shared across all noteworks crates and represent the
//! core domain entities. API-visible types serialize with camelCase field
//! names to match the wire contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::{derive_search_text, NoteField};

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Kind of note. Stored per note and used as a mandatory search filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum NoteType {
    /// Regular user content (default).
    #[default]
    Content,
    /// Conversational/chat transcript note.
    Chat,
    /// Reusable template.
    Template,
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "CONTENT"),
            Self::Chat => write!(f, "CHAT"),
            Self::Template => write!(f, "TEMPLATE"),
        }
    }
}

/// A note with its full field and tag projection.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub owner_id: Uuid,
    pub note_type: NoteType,
    pub fields: Vec<NoteField>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Derives this note's search text from its fields.
    ///
    /// The same derivation runs at embed time and at staleness-check time;
    /// see [`crate::fields::derive_search_text`].
    pub fn search_text(&self) -> String {
        derive_search_text(&self.fields)
    }
}

/// Request body for creating a note. Identity and workspace authorization
/// happen upstream; `owner_id` arrives already validated.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub workspace_id: Uuid,
    pub owner_id: Uuid,
    #[serde(default)]
    pub note_type: NoteType,
    #[serde(default)]
    pub fields: Vec<NoteField>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for updating a note. Omitted parts are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<NoteField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

// =============================================================================
// EMBEDDING TYPES
// =============================================================================

/// Embedding vector type (re-exported from pgvector).
pub use pgvector::Vector;

/// A note's stored embedding.
///
/// `search_text` is the exact derivation the vector was generated from; the
/// vector is stale when it no longer matches the note's current derivation.
#[derive(Debug, Clone)]
pub struct NoteEmbedding {
    pub note_id: Uuid,
    pub vector: Vector,
    pub model: String,
    pub search_text: String,
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// JOB TYPES
// =============================================================================

/// Status of an embedding job in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A queued embedding recompute for one note.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingJob {
    pub id: Uuid,
    pub note_id: Uuid,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Queue statistics summary.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub pending: i64,
    pub running: i64,
    pub completed_last_hour: i64,
    pub failed_last_hour: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Note {
        Note {
            id: Uuid::nil(),
            workspace_id: Uuid::nil(),
            owner_id: Uuid::nil(),
            note_type: NoteType::Content,
            fields: vec![NoteField::Text {
                label: "Title".to_string(),
                content: "hello".to_string(),
            }],
            tags: vec!["food".to_string()],
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_note_type_serde_uppercase() {
        assert_eq!(serde_json::to_string(&NoteType::Content).unwrap(), "\"CONTENT\"");
        assert_eq!(serde_json::to_string(&NoteType::Chat).unwrap(), "\"CHAT\"");
        assert_eq!(
            serde_json::to_string(&NoteType::Template).unwrap(),
            "\"TEMPLATE\""
        );

        let parsed: NoteType = serde_json::from_str("\"CHAT\"").unwrap();
        assert_eq!(parsed, NoteType::Chat);
    }

    #[test]
    fn test_note_type_default_is_content() {
        assert_eq!(NoteType::default(), NoteType::Content);
    }

    #[test]
    fn test_note_type_display() {
        assert_eq!(NoteType::Content.to_string(), "CONTENT");
        assert_eq!(NoteType::Template.to_string(), "TEMPLATE");
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert!(json.get("workspaceId").is_some());
        assert!(json.get("noteType").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("workspace_id").is_none());
    }

    #[test]
    fn test_note_search_text_uses_fields() {
        let note = sample_note();
        assert_eq!(note.search_text(), "hello ");
    }

    #[test]
    fn test_create_request_defaults() {
        let json = format!(
            r#"{{"workspaceId": "{}", "ownerId": "{}"}}"#,
            Uuid::nil(),
            Uuid::nil()
        );
        let req: CreateNoteRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.note_type, NoteType::Content);
        assert!(req.fields.is_empty());
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_update_request_partial() {
        let req: UpdateNoteRequest = serde_json::from_str(r#"{"tags": ["a"]}"#).unwrap();
        assert!(req.fields.is_none());
        assert_eq!(req.tags.as_deref(), Some(&["a".to_string()][..]));
    }

    #[test]
    fn test_job_status_serde_lowercase() {
        let round_trip = [
            (JobStatus::Pending, "pending"),
            (JobStatus::Running, "running"),
            (JobStatus::Completed, "completed"),
            (JobStatus::Failed, "failed"),
        ];
        for (status, expected) in round_trip {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", expected));
            let parsed: JobStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
