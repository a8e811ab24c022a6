//! Query planner: raw request in, normalized plan out.
//!
//! Planning is a pure transformation. It touches neither the database
//! nor the embedding provider, so every validation path is testable
//! without infrastructure.

use noteworks_core::{normalize_tags, Error, Result, RetrievalPlan, RetrievalRequest, TagPredicate};

/// Normalize a raw search request into an executable plan.
///
/// Rejects requests missing their required scope fields. Free text is
/// trimmed; a blank query normalizes to `None` and the engine degrades
/// to recency ordering. Tag names are trimmed and deduplicated, first
/// occurrence winning.
pub fn plan_query(request: &RetrievalRequest) -> Result<RetrievalPlan> {
    let workspace_id = request
        .workspace_id
        .ok_or_else(|| Error::InvalidInput("workspaceId is required".to_string()))?;
    let note_type = request
        .note_type
        .ok_or_else(|| Error::InvalidInput("noteType is required".to_string()))?;

    let query_text = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string);

    let tag_predicate = if request.all_tags_selected {
        TagPredicate::Any
    } else {
        TagPredicate::AnyOf(normalize_tags(&request.selected_tags))
    };

    Ok(RetrievalPlan {
        workspace_id,
        note_type,
        tag_predicate,
        query_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteworks_core::NoteType;
    use uuid::Uuid;

    fn valid_request() -> RetrievalRequest {
        RetrievalRequest {
            workspace_id: Some(Uuid::new_v4()),
            note_type: Some(NoteType::Content),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_requires_workspace_id() {
        let request = RetrievalRequest {
            workspace_id: None,
            ..valid_request()
        };

        let err = plan_query(&request).unwrap_err();
        match err {
            Error::InvalidInput(msg) => assert_eq!(msg, "workspaceId is required"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_requires_note_type() {
        let request = RetrievalRequest {
            note_type: None,
            ..valid_request()
        };

        let err = plan_query(&request).unwrap_err();
        match err {
            Error::InvalidInput(msg) => assert_eq!(msg, "noteType is required"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_missing_workspace_reported_first() {
        // Both scope fields absent: workspaceId wins the error message.
        let request = RetrievalRequest::default();

        let err = plan_query(&request).unwrap_err();
        match err {
            Error::InvalidInput(msg) => assert_eq!(msg, "workspaceId is required"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_trims_query_text() {
        let request = RetrievalRequest {
            query: Some("  lisbon food  ".to_string()),
            ..valid_request()
        };

        let plan = plan_query(&request).unwrap();
        assert_eq!(plan.query_text.as_deref(), Some("lisbon food"));
    }

    #[test]
    fn test_plan_blank_query_normalizes_to_none() {
        for query in [None, Some("".to_string()), Some("   \t ".to_string())] {
            let request = RetrievalRequest {
                query,
                ..valid_request()
            };
            let plan = plan_query(&request).unwrap();
            assert_eq!(plan.query_text, None);
        }
    }

    #[test]
    fn test_plan_all_tags_selected_yields_any() {
        let request = RetrievalRequest {
            all_tags_selected: true,
            // Selection is ignored once the wildcard is set.
            selected_tags: vec!["food".to_string()],
            ..valid_request()
        };

        let plan = plan_query(&request).unwrap();
        assert_eq!(plan.tag_predicate, TagPredicate::Any);
    }

    #[test]
    fn test_plan_explicit_tags_normalized() {
        let request = RetrievalRequest {
            all_tags_selected: false,
            selected_tags: vec![
                " food ".to_string(),
                "travel".to_string(),
                "food".to_string(),
                "  ".to_string(),
            ],
            ..valid_request()
        };

        let plan = plan_query(&request).unwrap();
        assert_eq!(
            plan.tag_predicate,
            TagPredicate::AnyOf(vec!["food".to_string(), "travel".to_string()])
        );
    }

    #[test]
    fn test_plan_empty_explicit_selection_is_unsatisfiable() {
        let request = RetrievalRequest {
            all_tags_selected: false,
            selected_tags: vec![],
            ..valid_request()
        };

        let plan = plan_query(&request).unwrap();
        assert!(plan.tag_predicate.matches_nothing());
    }

    #[test]
    fn test_plan_preserves_scope_fields() {
        let workspace_id = Uuid::new_v4();
        let request = RetrievalRequest {
            workspace_id: Some(workspace_id),
            note_type: Some(NoteType::Template),
            ..Default::default()
        };

        let plan = plan_query(&request).unwrap();
        assert_eq!(plan.workspace_id, workspace_id);
        assert_eq!(plan.note_type, NoteType::Template);
    }
}
