//! Pre-dispatch validation of hand-built requests against the endpoint catalog.
//!
//! Agents tend to guess endpoint paths. Before a mutating request is sent, the validator checks
//! the catalog in three increasingly fuzzy steps and stops at the first hit:
//!
//! 1. exact `path` + `http_method` lookup (literal endpoints)
//! 2. prefix lookup on the first three, then first two path segments, structurally matched
//!    against `{param}` templates (parameterized endpoints)
//! 3. substring lookup on the second path segment, returned as suggestions
//!
//! A failed catalog query at any step is returned as an error; it is never reported as "endpoint
//! not found".

use crate::catalog::{CatalogSource, EndpointRecord};
use crate::error::Result;
use crate::filter::{CatalogFilter, ItemRange};
use crate::path::paths_match;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

const EXACT_RANGE: ItemRange = ItemRange::new(0, 0);
const PREFIX_RANGE: ItemRange = ItemRange::new(0, 20);
const SIMILAR_RANGE: ItemRange = ItemRange::new(0, 5);
const MAX_SIMILAR: usize = 3;

/// A catalog entry was found for the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointMatch {
    /// Template path that structurally matched; absent for exact matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    pub requires_body: bool,
    pub body_sample: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarEndpoint {
    pub method: String,
    pub path: String,
    pub summary: String,
}

/// No catalog entry matched the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointMiss {
    pub suggestion: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub similar: Vec<SimilarEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(EndpointMatch),
    Invalid(EndpointMiss),
}

/// Why a request must not be dispatched. Both are expected outcomes the caller can recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("ENDPOINT NOT FOUND: {method} {path}")]
    EndpointNotFound {
        method: String,
        path: String,
        suggestion: String,
        similar: Vec<SimilarEndpoint>,
    },
    #[error("This endpoint requires a request BODY, not query params")]
    BodyRequiredMissing { body_sample: Option<String> },
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Decide whether a request for `method path` may be sent, given whether it carries a body.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EndpointNotFound`] when validation found no endpoint, and
    /// [`Rejection::BodyRequiredMissing`] when the endpoint needs a body that was not supplied.
    pub fn preflight(
        self,
        method: &str,
        path: &str,
        has_body: bool,
    ) -> std::result::Result<EndpointMatch, Rejection> {
        match self {
            Self::Invalid(miss) => Err(Rejection::EndpointNotFound {
                method: method.to_string(),
                path: path.to_string(),
                suggestion: miss.suggestion,
                similar: miss.similar,
            }),
            Self::Valid(m) if m.requires_body && !has_body => Err(Rejection::BodyRequiredMissing {
                body_sample: m.body_sample,
            }),
            Self::Valid(m) => Ok(m),
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Tagged<'a, T> {
            valid: bool,
            #[serde(flatten)]
            inner: &'a T,
        }

        match self {
            Self::Valid(m) => Tagged {
                valid: true,
                inner: m,
            }
            .serialize(serializer),
            Self::Invalid(m) => Tagged {
                valid: false,
                inner: m,
            }
            .serialize(serializer),
        }
    }
}

/// Validate that `method endpoint` targets an endpoint the catalog knows about.
///
/// Issues between one and four sequential catalog queries.
///
/// # Errors
///
/// Returns [`crate::DiscoveryError::CatalogQueryFailed`] if any catalog query fails.
pub async fn validate_endpoint<C>(
    catalog: &C,
    method: &str,
    endpoint: &str,
) -> Result<ValidationResult>
where
    C: CatalogSource + ?Sized,
{
    let parts: Vec<&str> = endpoint.trim_end_matches('/').split('/').collect();

    let exact = catalog
        .query_catalog(
            &CatalogFilter::path_eq(endpoint).and(CatalogFilter::method_eq(method)),
            EXACT_RANGE,
        )
        .await?;
    if let Some(record) = exact.first() {
        debug!(%method, %endpoint, "exact catalog match");
        return Ok(ValidationResult::Valid(body_requirements(record, None)));
    }

    for base in search_bases(&parts) {
        let candidates = catalog
            .query_catalog(
                &CatalogFilter::path_starts_with(&base).and(CatalogFilter::method_eq(method)),
                PREFIX_RANGE,
            )
            .await?;

        if let Some(record) = candidates.iter().find(|c| paths_match(&c.path, endpoint)) {
            debug!(%method, %endpoint, pattern = %record.path, "pattern catalog match");
            return Ok(ValidationResult::Valid(body_requirements(
                record,
                Some(record.path.clone()),
            )));
        }
    }

    let needle = if parts.len() > 1 {
        parts.get(1).copied().unwrap_or(endpoint)
    } else {
        endpoint
    };
    let similar: Vec<SimilarEndpoint> = catalog
        .query_catalog(
            &CatalogFilter::path_contains(needle).and(CatalogFilter::method_eq(method)),
            SIMILAR_RANGE,
        )
        .await?
        .into_iter()
        .take(MAX_SIMILAR)
        .map(|r| SimilarEndpoint {
            method: r.method,
            path: r.path,
            summary: r.summary,
        })
        .collect();

    debug!(%method, %endpoint, similar = similar.len(), "no catalog match");

    if !similar.is_empty() {
        return Ok(ValidationResult::Invalid(EndpointMiss {
            suggestion: format!("Endpoint {method} {endpoint} does not exist."),
            similar,
        }));
    }

    let base_path = match parts.split_last() {
        Some((_, init)) if !init.is_empty() => init.join("/"),
        _ => endpoint.to_string(),
    };
    Ok(ValidationResult::Invalid(EndpointMiss {
        suggestion: format!(
            "No {method} endpoints found matching '{base_path}'. Use qradar_discover to find valid endpoints."
        ),
        similar: Vec::new(),
    }))
}

/// Path prefixes tried by the pattern search: first three segments, then first two.
fn search_bases(parts: &[&str]) -> Vec<String> {
    [3, 2]
        .into_iter()
        .filter_map(|n| parts.get(..n).map(|p| p.join("/")))
        .collect()
}

fn body_requirements(record: &EndpointRecord, matched_pattern: Option<String>) -> EndpointMatch {
    let body = record.first_body_parameter();
    EndpointMatch {
        matched_pattern,
        requires_body: body.is_some_and(|b| b.required),
        body_sample: body.and_then(|b| b.sample()).map(str::to_string),
    }
}
