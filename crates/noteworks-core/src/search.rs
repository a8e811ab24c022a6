//! Retrieval request, plan, and result types.
//!
//! These types flow through the retrieval pipeline: a raw
//! [`RetrievalRequest`] is normalized into a [`RetrievalPlan`], the plan
//! selects [`CandidateNote`]s, and ranking produces a
//! [`RetrievalResponse`] of [`RankedNote`]s.

use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Note, NoteEmbedding, NoteType};

// =============================================================================
// REQUEST
// =============================================================================

/// Raw search request as assembled at the API boundary.
///
/// Validation happens during planning, not here: both scope fields stay
/// optional so a missing value can be rejected with a precise message.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    /// Workspace scope (required for a valid plan).
    pub workspace_id: Option<Uuid>,
    /// Note type filter (required for a valid plan).
    pub note_type: Option<NoteType>,
    /// Free-text query. Blank or missing degrades ranking to recency.
    #[serde(default)]
    pub query: Option<String>,
    /// Explicit tag selection, ignored when `all_tags_selected` is set.
    #[serde(default)]
    pub selected_tags: Vec<String>,
    /// When true, tag filtering is bypassed entirely.
    #[serde(default = "default_true")]
    pub all_tags_selected: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RetrievalRequest {
    fn default() -> Self {
        Self {
            workspace_id: None,
            note_type: None,
            query: None,
            selected_tags: Vec::new(),
            all_tags_selected: true,
        }
    }
}

// =============================================================================
// PLAN
// =============================================================================

/// Tag predicate of a normalized plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPredicate {
    /// All tags selected: excludes nothing on tag grounds.
    Any,
    /// Note must carry at least one of these tags. An empty set is
    /// unsatisfiable and matches nothing.
    AnyOf(Vec<String>),
}

impl TagPredicate {
    /// Whether a note with the given tags passes this predicate.
    pub fn matches(&self, tags: &[String]) -> bool {
        match self {
            TagPredicate::Any => true,
            TagPredicate::AnyOf(selected) => {
                tags.iter().any(|tag| selected.iter().any(|s| s == tag))
            }
        }
    }

    /// True when no note can satisfy the predicate.
    pub fn matches_nothing(&self) -> bool {
        matches!(self, TagPredicate::AnyOf(selected) if selected.is_empty())
    }
}

/// Normalized execution plan produced by the query planner.
///
/// Pure data: building a plan touches neither the database nor the
/// embedding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalPlan {
    pub workspace_id: Uuid,
    pub note_type: NoteType,
    pub tag_predicate: TagPredicate,
    /// Trimmed free text, `None` when the request carried none.
    pub query_text: Option<String>,
}

// =============================================================================
// CANDIDATES AND RESULTS
// =============================================================================

/// A structurally-eligible note with its stored embedding, if any.
#[derive(Debug, Clone)]
pub struct CandidateNote {
    pub note: Note,
    pub embedding: Option<NoteEmbedding>,
}

impl CandidateNote {
    /// The stored vector, but only while it is fresh.
    ///
    /// A vector is fresh when the search text recorded at generation time
    /// still equals the note's current derivation. Stale and absent vectors
    /// both yield `None`; the ranker treats them identically.
    pub fn fresh_vector(&self) -> Option<&Vector> {
        let embedding = self.embedding.as_ref()?;
        if embedding.search_text == self.note.search_text() {
            Some(&embedding.vector)
        } else {
            None
        }
    }
}

/// A note with its relevance score settled by ranking.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedNote {
    #[serde(flatten)]
    pub note: Note,
    /// Cosine similarity against the query vector. `None` when ranking ran
    /// in the recency branch (no query vector available).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Retrieval results response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResponse {
    pub notes: Vec<RankedNote>,
    /// Whether semantic ranking was applied. False when the recency
    /// fallback ran (no query, empty corpus, or provider failure).
    pub semantic_available: bool,
    /// Warnings about search degradation or issues.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::NoteField;
    use chrono::{TimeZone, Utc};

    fn note_with_tags(tags: &[&str]) -> Note {
        Note {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            owner_id: Uuid::nil(),
            note_type: NoteType::Content,
            fields: vec![NoteField::Text {
                label: "Title".to_string(),
                content: "hello".to_string(),
            }],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_predicate_any_matches_everything() {
        let pred = TagPredicate::Any;
        assert!(pred.matches(&[]));
        assert!(pred.matches(&["food".to_string()]));
        assert!(!pred.matches_nothing());
    }

    #[test]
    fn test_predicate_any_of_intersects() {
        let pred = TagPredicate::AnyOf(vec!["food".to_string(), "travel".to_string()]);
        assert!(pred.matches(&["food".to_string()]));
        assert!(pred.matches(&["work".to_string(), "travel".to_string()]));
        assert!(!pred.matches(&["work".to_string()]));
        assert!(!pred.matches(&[]));
    }

    #[test]
    fn test_predicate_empty_set_matches_nothing() {
        let pred = TagPredicate::AnyOf(vec![]);
        assert!(pred.matches_nothing());
        assert!(!pred.matches(&["food".to_string()]));
        assert!(!pred.matches(&[]));
    }

    #[test]
    fn test_request_all_tags_defaults_true() {
        let req: RetrievalRequest =
            serde_json::from_str(r#"{"workspaceId": null, "noteType": null}"#).unwrap();
        assert!(req.all_tags_selected);
        assert!(req.selected_tags.is_empty());

        let default_req = RetrievalRequest::default();
        assert!(default_req.all_tags_selected);
    }

    #[test]
    fn test_request_camel_case_wire_names() {
        let json = r#"{
            "workspaceId": "00000000-0000-0000-0000-000000000000",
            "noteType": "CONTENT",
            "query": "lisbon",
            "selectedTags": ["food"],
            "allTagsSelected": false
        }"#;
        let req: RetrievalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.workspace_id, Some(Uuid::nil()));
        assert_eq!(req.note_type, Some(NoteType::Content));
        assert_eq!(req.query.as_deref(), Some("lisbon"));
        assert_eq!(req.selected_tags, vec!["food".to_string()]);
        assert!(!req.all_tags_selected);
    }

    #[test]
    fn test_fresh_vector_requires_matching_search_text() {
        let note = note_with_tags(&[]);
        let current = note.search_text();

        let fresh = CandidateNote {
            note: note.clone(),
            embedding: Some(NoteEmbedding {
                note_id: note.id,
                vector: Vector::from(vec![1.0, 0.0]),
                model: "test".to_string(),
                search_text: current.clone(),
                generated_at: Utc::now(),
            }),
        };
        assert!(fresh.fresh_vector().is_some());

        let stale = CandidateNote {
            note: note.clone(),
            embedding: Some(NoteEmbedding {
                note_id: note.id,
                vector: Vector::from(vec![1.0, 0.0]),
                model: "test".to_string(),
                search_text: "something older ".to_string(),
                generated_at: Utc::now(),
            }),
        };
        assert!(stale.fresh_vector().is_none());

        let missing = CandidateNote {
            note,
            embedding: None,
        };
        assert!(missing.fresh_vector().is_none());
    }

    #[test]
    fn test_ranked_note_flattens_note_fields() {
        let note = note_with_tags(&["food"]);
        let ranked = RankedNote {
            note,
            score: Some(0.5),
        };
        let json = serde_json::to_value(&ranked).unwrap();
        // Flattened projection: note fields sit beside the score.
        assert!(json.get("workspaceId").is_some());
        assert!(json.get("tags").is_some());
        assert_eq!(json["score"], 0.5);
    }

    #[test]
    fn test_ranked_note_omits_absent_score() {
        let ranked = RankedNote {
            note: note_with_tags(&[]),
            score: None,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert!(json.get("score").is_none());
    }

    #[test]
    fn test_response_serialization_shape() {
        let response = RetrievalResponse {
            notes: vec![],
            semantic_available: false,
            warnings: vec!["embedding provider unavailable".to_string()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["semanticAvailable"], false);
        assert_eq!(json["warnings"][0], "embedding provider unavailable");
    }
}
