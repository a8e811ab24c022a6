//! Typed note fields and the search-text derivation.
//!
//! A note's body is an ordered sequence of tagged field variants rather than
//! a loosely-typed blob. The tag is carried on the wire as `type`
//! (`TEXT`/`NUMBER`/`DATETIME`), so the derivation over field contents is
//! total: adding a variant without deciding its search-text contribution is
//! a compile error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single typed field on a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum NoteField {
    /// Free text (titles, body paragraphs).
    Text { label: String, content: String },
    /// Numeric value. Does not contribute to search text.
    Number { label: String, value: f64 },
    /// Point in time, rendered as RFC 3339 for search text.
    DateTime {
        label: String,
        value: DateTime<Utc>,
    },
}

impl NoteField {
    /// The fragment this field contributes to the note's search text,
    /// or `None` for non-textual fields.
    pub fn search_fragment(&self) -> Option<String> {
        match self {
            NoteField::Text { content, .. } => Some(content.clone()),
            NoteField::DateTime { value, .. } => Some(value.to_rfc3339()),
            NoteField::Number { .. } => None,
        }
    }
}

/// Derives the search text for a sequence of fields.
///
/// Deterministic: each contributing field appends its fragment followed by a
/// single space, in field order. The result is compared byte-for-byte against
/// the stored copy on a note's embedding to detect staleness, so the
/// derivation must never change shape without a re-embed migration.
pub fn derive_search_text(fields: &[NoteField]) -> String {
    let mut text = String::new();
    for field in fields {
        if let Some(fragment) = field.search_fragment() {
            text.push_str(&fragment);
            text.push(' ');
        }
    }
    text
}
