//! Tag normalization.
//!
//! Tags are free-form user labels. Before they reach storage or a filter
//! predicate they pass through [`normalize_tags`], which trims whitespace,
//! drops empties, and removes duplicates while preserving first-seen order.

/// Normalize a raw tag list.
///
/// Whitespace-only entries vanish; duplicates keep their first occurrence.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::new();
    for tag in raw {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}
