//! QRadar REST API transport.
//!
//! This crate is intended to be used by:
//! - `qradar-mcp-server` (tool dispatch)
//! - `qradar-discovery` consumers, through the [`qradar_discovery::CatalogSource`] impl on
//!   [`runtime::QRadarClient`]
//!
//! It intentionally contains **no** MCP logic and **no** endpoint validation policy.

pub mod catalog;
pub mod config;
pub mod error;
pub mod runtime;
pub mod safety;

pub use config::QRadarConfig;
pub use error::{QRadarError, Result};
pub use runtime::{ApiRequest, ApiResponse, QRadarClient};

pub use reqwest::Method;
