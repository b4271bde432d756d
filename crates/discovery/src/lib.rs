//! QRadar endpoint discovery and request pre-validation.
//!
//! This crate turns the raw `/help/endpoints` catalog served by QRadar into categorized,
//! size-bounded endpoint metadata, and uses the same catalog to check that a request an agent
//! built by hand actually targets an existing endpoint before it is sent.
//!
//! It intentionally contains **no** HTTP code: the catalog is reached through the
//! [`catalog::CatalogSource`] seam, implemented by `qradar-client` in production and by
//! [`memory::StaticCatalog`] in tests.

pub mod cache;
pub mod catalog;
pub mod categorize;
pub mod error;
pub mod filter;
pub mod format;
pub mod memory;
pub mod path;
pub mod validate;

pub use cache::{CacheKey, EndpointCache};
pub use catalog::{CatalogSource, EndpointRecord, MimeType, ParameterKind, ParameterSpec};
pub use categorize::{OperationCategory, categorize};
pub use error::{CatalogQueryError, DiscoveryError, Result};
pub use filter::{CatalogField, CatalogFilter, ItemRange};
pub use format::{FormattedEndpoint, ParamGroups, ParamInfo, format_endpoint, partition_parameters};
pub use memory::StaticCatalog;
pub use path::paths_match;
pub use validate::{
    EndpointMatch, EndpointMiss, Rejection, SimilarEndpoint, ValidationResult, validate_endpoint,
};
