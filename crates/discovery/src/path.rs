//! Structural matching of templated catalog paths against concrete request paths.

/// Check whether `actual` fits `pattern`, where `{name}` segments in the pattern match any
/// single concrete segment.
///
/// Trailing slashes are ignored on both sides; every other segment must be identical.
/// This is structural only: `/users/{id}` matches `/users/abc` as well as `/users/123`.
#[must_use]
pub fn paths_match(pattern: &str, actual: &str) -> bool {
    let pattern_parts: Vec<&str> = pattern.trim_end_matches('/').split('/').collect();
    let actual_parts: Vec<&str> = actual.trim_end_matches('/').split('/').collect();

    if pattern_parts.len() != actual_parts.len() {
        return false;
    }

    pattern_parts
        .iter()
        .zip(&actual_parts)
        .all(|(p, a)| is_placeholder(p) || p == a)
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}
