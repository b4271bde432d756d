//! [`CatalogSource`] over the console's own `/help/endpoints` resource.

use crate::error::QRadarError;
use crate::runtime::{ApiRequest, QRadarClient};
use async_trait::async_trait;
use qradar_discovery::{CatalogFilter, CatalogQueryError, CatalogSource, EndpointRecord, ItemRange};
use serde_json::Value;
use tracing::debug;

/// Self-describing endpoint catalog of the QRadar REST API.
pub const HELP_ENDPOINTS: &str = "/help/endpoints";

impl QRadarClient {
    /// Query `/help/endpoints` with a rendered filter and item range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a list of endpoints.
    pub async fn list_endpoints(
        &self,
        filter: &CatalogFilter,
        range: ItemRange,
    ) -> crate::Result<Vec<EndpointRecord>> {
        let filter = filter.to_string();
        debug!(filter = %filter, range = %range, "query endpoint catalog");

        let resp = self
            .request(
                ApiRequest::get(HELP_ENDPOINTS)
                    .param("filter", filter)
                    .range(range),
            )
            .await?;

        match resp.data {
            Value::Null => Ok(Vec::new()),
            data @ Value::Array(_) => serde_json::from_value(data)
                .map_err(|e| QRadarError::MalformedCatalog(e.to_string())),
            other => Err(QRadarError::MalformedCatalog(format!(
                "expected a JSON array, got {}",
                json_type(&other)
            ))),
        }
    }
}

#[async_trait]
impl CatalogSource for QRadarClient {
    async fn query_catalog(
        &self,
        filter: &CatalogFilter,
        range: ItemRange,
    ) -> Result<Vec<EndpointRecord>, CatalogQueryError> {
        Ok(self.list_endpoints(filter, range).await?)
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QRadarConfig;
    use qradar_discovery::{ValidationResult, validate_endpoint};
    use qradar_test_support::FakeQRadar;
    use serde_json::json;

    fn catalog() -> Vec<Value> {
        vec![
            json!({
                "http_method": "GET",
                "path": "/siem/offenses/{offense_id}",
                "summary": "Retrieve an offense",
                "parameters": [{"parameter_name": "offense_id", "type": "PATH", "required": true}]
            }),
            json!({"http_method": "GET", "path": "/siem/offenses", "summary": "List offenses"}),
            json!({"http_method": "POST", "path": "/ariel/searches", "summary": "Create a search"}),
        ]
    }

    #[tokio::test]
    async fn catalog_queries_send_filter_and_range() {
        let fake = FakeQRadar::start(catalog()).await.expect("fake qradar");
        let client =
            QRadarClient::new(QRadarConfig::new(fake.base_url(), "tok")).expect("client");

        let records = client
            .query_catalog(
                &CatalogFilter::path_starts_with("/siem").and(CatalogFilter::method_eq("GET")),
                ItemRange::first(1),
            )
            .await
            .expect("query");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/siem/offenses/{offense_id}");

        let seen = fake.catalog_queries();
        assert_eq!(
            seen,
            vec![(
                "path ILIKE '/siem%' AND http_method='GET'".to_string(),
                Some("items=0-0".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn validator_runs_against_the_console() {
        let fake = FakeQRadar::start(catalog()).await.expect("fake qradar");
        let client =
            QRadarClient::new(QRadarConfig::new(fake.base_url(), "tok")).expect("client");

        let result = validate_endpoint(&client, "GET", "/siem/offenses/42")
            .await
            .expect("validate");
        let ValidationResult::Valid(m) = result else {
            panic!("expected a match, got {result:?}");
        };
        assert_eq!(m.matched_pattern.as_deref(), Some("/siem/offenses/{offense_id}"));
        assert!(!m.requires_body);
    }

    #[tokio::test]
    async fn unauthorized_catalog_is_not_reported_as_not_found() {
        let fake = FakeQRadar::start(catalog()).await.expect("fake qradar");
        let client =
            QRadarClient::new(QRadarConfig::new(fake.base_url(), "wrong")).expect("client");
        fake.require_token("tok");

        let err = validate_endpoint(&client, "POST", "/ariel/searches")
            .await
            .unwrap_err();
        let qradar_discovery::DiscoveryError::CatalogQueryFailed(inner) = err;
        assert_eq!(inner.status_code, Some(401));
        assert!(inner.message.starts_with("Unauthorized"));
    }

    #[tokio::test]
    async fn non_array_catalog_is_malformed() {
        let fake = FakeQRadar::start(Vec::new()).await.expect("fake qradar");
        fake.set_catalog_override(json!({"oops": true}));
        let client =
            QRadarClient::new(QRadarConfig::new(fake.base_url(), "tok")).expect("client");

        let err = client
            .list_endpoints(&CatalogFilter::path_eq("/x"), ItemRange::first(1))
            .await
            .unwrap_err();
        assert!(matches!(err, QRadarError::MalformedCatalog(_)), "{err:?}");
    }
}
