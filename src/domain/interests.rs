//! Interest tag parsing.

use std::collections::HashSet;

/// Parses the JSON-encoded interest list a client sends on connect.
///
/// Tags are trimmed, blank tags dropped and duplicates collapsed keeping
/// the first occurrence, so the supplied order is preserved. Anything that
/// is not a JSON array of strings is logged and treated as no interests,
/// which falls back to unconditional matching.
#[must_use]
pub fn parse_interests(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Option<Vec<String>>>(raw) {
        Ok(tags) => normalize(tags.unwrap_or_default()),
        Err(error) => {
            tracing::warn!(%error, raw, "ignoring malformed interests");
            Vec::new()
        }
    }
}

fn normalize(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}
