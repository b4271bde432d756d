//! In-memory catalog, used by tests and offline tooling.

use crate::catalog::{CatalogSource, EndpointRecord};
use crate::error::CatalogQueryError;
use crate::filter::{CatalogFilter, ItemRange};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// A fixed list of endpoints that evaluates filters locally, in catalog order.
///
/// Every query is recorded so callers can assert on what was asked and in which order. A failure
/// can be injected to simulate the remote catalog being unreachable.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    records: Arc<Vec<EndpointRecord>>,
    queries: Arc<Mutex<Vec<String>>>,
    failure: Option<CatalogQueryError>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(records: Vec<EndpointRecord>) -> Self {
        Self {
            records: Arc::new(records),
            queries: Arc::default(),
            failure: None,
        }
    }

    /// A catalog whose every query fails with `error`.
    #[must_use]
    pub fn failing(error: CatalogQueryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Rendered filters of every query received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn query_catalog(
        &self,
        filter: &CatalogFilter,
        range: ItemRange,
    ) -> Result<Vec<EndpointRecord>, CatalogQueryError> {
        self.queries.lock().push(filter.to_string());

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .skip(range.start)
            .take(range.len())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn applies_filter_and_range() {
        let catalog = StaticCatalog::new(vec![
            EndpointRecord::new("GET", "/siem/offenses"),
            EndpointRecord::new("GET", "/siem/offenses/{offense_id}"),
            EndpointRecord::new("POST", "/siem/offenses/{offense_id}"),
            EndpointRecord::new("GET", "/siem/source_addresses"),
        ]);

        let filter = CatalogFilter::path_starts_with("/siem/offenses")
            .and(CatalogFilter::method_eq("GET"));
        let all = catalog
            .query_catalog(&filter, ItemRange::new(0, 20))
            .await
            .expect("query");
        assert_eq!(all.len(), 2);

        let one = catalog
            .query_catalog(&filter, ItemRange::new(1, 1))
            .await
            .expect("query");
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].path, "/siem/offenses/{offense_id}");

        assert_eq!(catalog.queries().len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let catalog = StaticCatalog::failing(CatalogQueryError::new("Unauthorized").with_status(401));
        let err = catalog
            .query_catalog(&CatalogFilter::path_eq("/x"), ItemRange::first(1))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, Some(401));
    }
}
