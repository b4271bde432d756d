//! Presentation metadata for catalog endpoints.
//!
//! Raw catalog records can be large (long descriptions, full sample payloads). Formatting bounds
//! them to what an agent needs to build a correct request, and records the result in the
//! [`EndpointCache`].

use crate::cache::EndpointCache;
use crate::catalog::{EndpointRecord, ParameterKind, ParameterSpec};
use crate::categorize::{OperationCategory, categorize};
use serde::Serialize;
use std::fmt::Write as _;

/// Maximum characters kept from a parameter description.
pub const DESCRIPTION_LIMIT: usize = 150;
/// Maximum characters kept from a body sample payload.
pub const SAMPLE_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub required: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    /// Raw catalog kind, only set for parameters of an unrecognized kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamGroups {
    pub query: Vec<ParamInfo>,
    pub path: Vec<ParamInfo>,
    pub body: Vec<ParamInfo>,
    pub header: Vec<ParamInfo>,
    /// Parameters whose kind is missing or not one of the four known kinds.
    pub other: Vec<ParamInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedEndpoint {
    pub method: String,
    pub path: String,
    pub operation: OperationCategory,
    pub summary: String,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<ParamInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path_params: Vec<ParamInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body_params: Vec<ParamInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub header_params: Vec<ParamInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_params: Vec<ParamInfo>,
    pub usage_example: String,
}

/// Split catalog parameters by where they travel, keeping catalog order within each group.
#[must_use]
pub fn partition_parameters(parameters: &[ParameterSpec]) -> ParamGroups {
    let mut groups = ParamGroups::default();

    for p in parameters {
        let mut info = ParamInfo {
            name: p.name.clone(),
            required: p.required,
            description: truncate_chars(
                p.description.as_deref().unwrap_or_default(),
                DESCRIPTION_LIMIT,
            ),
            sample: None,
            kind: None,
        };

        match &p.kind {
            ParameterKind::Query => groups.query.push(info),
            ParameterKind::Path => groups.path.push(info),
            ParameterKind::Body => {
                info.sample = p.sample().map(|s| truncate_chars(s, SAMPLE_LIMIT));
                groups.body.push(info);
            }
            ParameterKind::Header => groups.header.push(info),
            kind @ (ParameterKind::Unknown(_) | ParameterKind::Missing) => {
                tracing::debug!(param = %p.name, kind = %kind, "parameter of unrecognized kind");
                info.kind = Some(kind.to_string());
                groups.other.push(info);
            }
        }
    }

    groups
}

/// Format a raw catalog record and remember it in `cache`.
pub fn format_endpoint(record: &EndpointRecord, cache: &EndpointCache) -> FormattedEndpoint {
    let groups = partition_parameters(&record.parameters);
    let usage_example = usage_example(&record.method, &record.path, &groups);

    let formatted = FormattedEndpoint {
        method: record.method.clone(),
        path: record.path.clone(),
        operation: categorize(&record.method, &record.path),
        summary: record.summary.clone(),
        deprecated: record.deprecated,
        query_params: groups.query,
        path_params: groups.path,
        body_params: groups.body,
        header_params: groups.header,
        other_params: groups.other,
        usage_example,
    };

    cache.put(formatted.clone());
    formatted
}

fn usage_example(method: &str, path: &str, groups: &ParamGroups) -> String {
    let mut usage = format!("method=\"{method}\", endpoint=\"{path}\"");

    if let Some(q) = groups.query.iter().find(|p| p.required) {
        let _ = write!(usage, ", params={{\"{}\": \"...\"}}", q.name);
    }
    if groups.body.first().is_some_and(|b| b.required) {
        usage.push_str(", body={...}");
    }

    usage
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offense_notes() -> EndpointRecord {
        EndpointRecord::new("POST", "/siem/offenses/{offense_id}/notes")
            .with_summary("Create a note on an offense")
            .with_parameter(
                ParameterSpec::new("offense_id", ParameterKind::Path)
                    .required(true)
                    .with_description("The offense ID"),
            )
            .with_parameter(
                ParameterSpec::new("note_text", ParameterKind::Query)
                    .required(true)
                    .with_description("The note text"),
            )
            .with_parameter(ParameterSpec::new("fields", ParameterKind::Query))
            .with_parameter(ParameterSpec::new("Range", ParameterKind::Header))
    }

    #[test]
    fn partitions_preserving_order() {
        let params = vec![
            ParameterSpec::new("b", ParameterKind::Query),
            ParameterSpec::new("id", ParameterKind::Path),
            ParameterSpec::new("a", ParameterKind::Query),
            ParameterSpec::new("data", ParameterKind::Body).with_sample("{}"),
            ParameterSpec::new("Range", ParameterKind::Header),
            ParameterSpec::new("weird", ParameterKind::Unknown("FORM".to_string())),
            ParameterSpec::new("untyped", ParameterKind::Missing),
        ];
        let g = partition_parameters(&params);

        let names = |v: &[ParamInfo]| v.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&g.query), ["b", "a"]);
        assert_eq!(names(&g.path), ["id"]);
        assert_eq!(names(&g.body), ["data"]);
        assert_eq!(names(&g.header), ["Range"]);
        assert_eq!(names(&g.other), ["weird", "untyped"]);
        assert_eq!(g.other[0].kind.as_deref(), Some("FORM"));
        assert_eq!(g.body[0].sample.as_deref(), Some("{}"));
        assert_eq!(g.query[0].sample, None);
    }

    #[test]
    fn truncates_description_and_sample() {
        let long_desc = "d".repeat(200);
        let long_sample = "s".repeat(600);
        let params = vec![
            ParameterSpec::new("data", ParameterKind::Body)
                .with_description(long_desc)
                .with_sample(long_sample),
        ];
        let g = partition_parameters(&params);
        assert_eq!(g.body[0].description.chars().count(), 150);
        assert_eq!(g.body[0].sample.as_deref().map(str::len), Some(500));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let desc = "é".repeat(151);
        let g = partition_parameters(&[
            ParameterSpec::new("x", ParameterKind::Query).with_description(desc)
        ]);
        assert_eq!(g.query[0].description.chars().count(), 150);
    }

    #[test]
    fn omits_empty_groups_and_builds_usage() {
        let cache = EndpointCache::new();
        let f = format_endpoint(&offense_notes(), &cache);

        assert_eq!(f.operation, OperationCategory::UpdateAction);
        assert_eq!(
            f.usage_example,
            r#"method="POST", endpoint="/siem/offenses/{offense_id}/notes", params={"note_text": "..."}"#
        );

        let v = serde_json::to_value(&f).expect("serializes");
        let obj = v.as_object().expect("object");
        assert!(obj.contains_key("query_params"));
        assert!(obj.contains_key("path_params"));
        assert!(obj.contains_key("header_params"));
        assert!(!obj.contains_key("body_params"));
        assert!(!obj.contains_key("other_params"));
        assert_eq!(v["operation"], "UPDATE_ACTION");
    }

    #[test]
    fn usage_mentions_body_only_when_first_body_param_is_required() {
        let cache = EndpointCache::new();
        let required = EndpointRecord::new("POST", "/reference_data/sets/{name}").with_parameter(
            ParameterSpec::new("data", ParameterKind::Body).required(true),
        );
        assert_eq!(
            format_endpoint(&required, &cache).usage_example,
            r#"method="POST", endpoint="/reference_data/sets/{name}", body={...}"#
        );

        let optional = EndpointRecord::new("POST", "/ariel/searches")
            .with_parameter(ParameterSpec::new("data", ParameterKind::Body))
            .with_parameter(ParameterSpec::new("more", ParameterKind::Body).required(true));
        assert_eq!(
            format_endpoint(&optional, &cache).usage_example,
            r#"method="POST", endpoint="/ariel/searches""#
        );
    }

    #[test]
    fn formatting_twice_is_idempotent() {
        let cache = EndpointCache::new();
        let first = serde_json::to_string(&format_endpoint(&offense_notes(), &cache))
            .expect("serializes");
        let second = serde_json::to_string(&format_endpoint(&offense_notes(), &cache))
            .expect("serializes");

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert!(
            cache
                .get("POST", "/siem/offenses/{offense_id}/notes")
                .is_some()
        );
    }
}
