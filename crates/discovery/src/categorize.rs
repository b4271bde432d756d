//! Operation categories derived from HTTP method and path shape.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    Create,
    UpdateAction,
    GetOne,
    List,
    Delete,
    Update,
    /// Method outside the five the catalog normally uses; carries the raw method.
    Other(String),
}

impl OperationCategory {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "CREATE",
            Self::UpdateAction => "UPDATE_ACTION",
            Self::GetOne => "GET_ONE",
            Self::List => "LIST",
            Self::Delete => "DELETE",
            Self::Update => "UPDATE",
            Self::Other(method) => method,
        }
    }
}

impl fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OperationCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Categorize an endpoint by its HTTP method and whether its path carries a `{param}`.
///
/// First match wins:
/// - `POST` without a path param creates, `POST` with one is an update/action
/// - `GET` with a path param fetches one resource, without one it lists
/// - `DELETE` deletes, `PUT`/`PATCH` update
/// - anything else falls back to the raw method
#[must_use]
pub fn categorize(method: &str, path: &str) -> OperationCategory {
    let has_path_param = path.contains('{');

    match method {
        "POST" if has_path_param => OperationCategory::UpdateAction,
        "POST" => OperationCategory::Create,
        "GET" if has_path_param => OperationCategory::GetOne,
        "GET" => OperationCategory::List,
        "DELETE" => OperationCategory::Delete,
        "PUT" | "PATCH" => OperationCategory::Update,
        other => OperationCategory::Other(other.to_string()),
    }
}
