//! Wire model of the QRadar endpoint catalog (`GET /api/help/endpoints`) and the seam used to
//! query it.

use crate::error::CatalogQueryError;
use crate::filter::{CatalogFilter, ItemRange};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One endpoint as described by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointRecord {
    #[serde(rename = "http_method", default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deprecated: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterSpec>,
}

impl EndpointRecord {
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            summary: String::new(),
            deprecated: false,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// First BODY parameter in catalog order, if any.
    #[must_use]
    pub fn first_body_parameter(&self) -> Option<&ParameterSpec> {
        self.parameters
            .iter()
            .find(|p| p.kind == ParameterKind::Body)
    }
}

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParameterKind {
    Query,
    Path,
    Body,
    Header,
    /// A kind the catalog reports that is not one of the four above.
    Unknown(String),
    /// No kind at all (absent or null `type`).
    #[default]
    Missing,
}

impl ParameterKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Query => "QUERY",
            Self::Path => "PATH",
            Self::Body => "BODY",
            Self::Header => "HEADER",
            Self::Unknown(raw) => raw,
            Self::Missing => "",
        }
    }
}

impl From<&str> for ParameterKind {
    fn from(value: &str) -> Self {
        match value {
            "QUERY" => Self::Query,
            "PATH" => Self::Path,
            "BODY" => Self::Body,
            "HEADER" => Self::Header,
            "" => Self::Missing,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ParameterKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParameterKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Missing, Self::from))
    }
}

/// One catalog parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParameterSpec {
    #[serde(rename = "parameter_name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ParameterKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mime_types: Vec<MimeType>,
}

impl ParameterSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: None,
            mime_types: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.mime_types.push(MimeType {
            mime_type: Some("application/json".to_string()),
            sample: Some(sample.into()),
        });
        self
    }

    /// First non-empty sample payload across the declared mime types.
    #[must_use]
    pub fn sample(&self) -> Option<&str> {
        self.mime_types
            .iter()
            .filter_map(|m| m.sample.as_deref())
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MimeType {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub sample: Option<String>,
}

/// Read access to the remote endpoint catalog.
///
/// Implementations translate the typed [`CatalogFilter`] and [`ItemRange`] into whatever the
/// backing store understands (the QRadar filter language and `Range: items=` header in
/// production).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Return the catalog entries matching `filter`, limited to `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself failed (transport, auth, malformed response).
    /// An empty result is not an error.
    async fn query_catalog(
        &self,
        filter: &CatalogFilter,
        range: ItemRange,
    ) -> Result<Vec<EndpointRecord>, CatalogQueryError>;
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
