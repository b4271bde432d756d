//! Typed catalog filter expressions.
//!
//! QRadar list endpoints accept a `filter` query parameter written in a small expression language
//! (`field = 'value'`, `field ILIKE '%value%'`, combined with `AND` / `OR`) and paginate through
//! an inclusive `Range: items=start-end` header. The validator and the discover tool build filters
//! through this module so the same expression can be rendered for the wire or evaluated locally.

use crate::catalog::EndpointRecord;
use std::fmt;

/// Catalog fields that filters may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    Path,
    HttpMethod,
    Summary,
}

impl CatalogField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::HttpMethod => "http_method",
            Self::Summary => "summary",
        }
    }

    fn value_of(self, record: &EndpointRecord) -> &str {
        match self {
            Self::Path => &record.path,
            Self::HttpMethod => &record.method,
            Self::Summary => &record.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFilter {
    /// `field='value'`
    Eq(CatalogField, String),
    /// `field ILIKE 'pattern'`, where `%` matches any run of characters.
    ILike(CatalogField, String),
    And(Box<CatalogFilter>, Box<CatalogFilter>),
    Or(Box<CatalogFilter>, Box<CatalogFilter>),
}

impl CatalogFilter {
    #[must_use]
    pub fn path_eq(path: impl Into<String>) -> Self {
        Self::Eq(CatalogField::Path, path.into())
    }

    #[must_use]
    pub fn method_eq(method: impl Into<String>) -> Self {
        Self::Eq(CatalogField::HttpMethod, method.into())
    }

    /// Paths starting with `prefix`.
    #[must_use]
    pub fn path_starts_with(prefix: &str) -> Self {
        Self::ILike(CatalogField::Path, format!("{prefix}%"))
    }

    /// Paths containing `needle` anywhere.
    #[must_use]
    pub fn path_contains(needle: &str) -> Self {
        Self::ILike(CatalogField::Path, format!("%{needle}%"))
    }

    #[must_use]
    pub fn summary_contains(needle: &str) -> Self {
        Self::ILike(CatalogField::Summary, format!("%{needle}%"))
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Evaluate this filter against a record the way the QRadar server does.
    #[must_use]
    pub fn matches(&self, record: &EndpointRecord) -> bool {
        match self {
            Self::Eq(field, value) => field.value_of(record) == value,
            Self::ILike(field, pattern) => ilike(field.value_of(record), pattern),
            Self::And(a, b) => a.matches(record) && b.matches(record),
            Self::Or(a, b) => a.matches(record) || b.matches(record),
        }
    }
}

impl fmt::Display for CatalogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(field, value) => write!(f, "{}='{}'", field.as_str(), quote(value)),
            Self::ILike(field, pattern) => {
                write!(f, "{} ILIKE '{}'", field.as_str(), quote(pattern))
            }
            Self::And(a, b) => write!(f, "{a} AND {b}"),
            Self::Or(a, b) => write!(f, "({a} OR {b})"),
        }
    }
}

/// Inclusive item range for catalog pagination (`0-9` is the first ten items).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRange {
    pub start: usize,
    pub end: usize,
}

impl ItemRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The first `n` items (`n` is clamped to at least one).
    #[must_use]
    pub const fn first(n: usize) -> Self {
        let n = if n == 0 { 1 } else { n };
        Self { start: 0, end: n - 1 }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for ItemRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Case-insensitive SQL `LIKE` with `%` wildcards only.
fn ilike(value: &str, pattern: &str) -> bool {
    let value = value.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();

    let [first, middle @ .., last] = parts.as_slice() else {
        return value == pattern;
    };

    let Some(mut rest) = value.strip_prefix(first) else {
        return false;
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_qradar_filter_syntax() {
        let f = CatalogFilter::path_eq("/siem/offenses").and(CatalogFilter::method_eq("GET"));
        assert_eq!(f.to_string(), "path='/siem/offenses' AND http_method='GET'");

        let f = CatalogFilter::path_contains("user")
            .or(CatalogFilter::summary_contains("user"))
            .and(CatalogFilter::method_eq("POST"));
        assert_eq!(
            f.to_string(),
            "(path ILIKE '%user%' OR summary ILIKE '%user%') AND http_method='POST'"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let f = CatalogFilter::path_eq("/a'b");
        assert_eq!(f.to_string(), r"path='/a\'b'");
    }

    #[test]
    fn ilike_wildcards_and_case() {
        assert!(ilike("/siem/offenses", "/siem%"));
        assert!(ilike("/SIEM/offenses", "/siem%"));
        assert!(ilike("/config/access/users", "%users%"));
        assert!(ilike("/a/b", "/a/b"));
        assert!(!ilike("/a/b", "/a"));
        assert!(!ilike("/siem", "/siem/offenses%"));
        assert!(ilike("abc", "%"));
        assert!(!ilike("aba", "%ab%ab%"));
    }

    #[test]
    fn ranges_render_inclusive() {
        assert_eq!(ItemRange::first(10).to_string(), "0-9");
        assert_eq!(ItemRange::first(0).to_string(), "0-0");
        assert_eq!(ItemRange::new(0, 20).len(), 21);
    }
}
