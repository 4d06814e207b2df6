// Hosting location lookup (ipgeolocation.io)

use super::{decode_json, or_unknown, require_key, trim_base};
use crate::collector::{Collector, ScanTarget};
use crate::error::Result;
use crate::result::{CollectorDetail, CollectorKind, CollectorResult};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.ipgeolocation.io";

#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    country_name: Option<String>,
    isp: Option<String>,
    organization: Option<String>,
}

pub struct GeolocationCollector {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeolocationCollector {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    async fn fetch(&self, target: &ScanTarget) -> Result<CollectorResult> {
        let api_key = require_key(&self.api_key, "geolocation")?;

        let response = self
            .client
            .get(format!("{}/ipgeo", self.base_url))
            .query(&[("apiKey", api_key), ("ip", target.domain.as_str())])
            .send()
            .await?;
        let body: GeolocationResponse = decode_json(response).await?;

        Ok(CollectorResult::new(
            CollectorKind::Geolocation,
            CollectorDetail::Geolocation {
                country: or_unknown(body.country_name),
                isp: or_unknown(body.isp),
                organization: or_unknown(body.organization),
            },
        ))
    }
}

impl Collector for GeolocationCollector {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Geolocation
    }

    fn query<'a>(&'a self, target: &'a ScanTarget) -> BoxFuture<'a, Result<CollectorResult>> {
        Box::pin(self.fetch(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::run_collector;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    #[tokio::test]
    async fn test_geolocation_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ipgeo"))
            .and(query_param("ip", "example.com"))
            .and(query_param("apiKey", "geo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "country_name": "United States",
                "isp": "Edgecast Inc.",
                "organization": ""
            })))
            .mount(&mock_server)
            .await;

        let collector = GeolocationCollector::new(Client::new(), Some("geo-key".to_string()))
            .with_base_url(&mock_server.uri());
        let result = collector
            .query(&ScanTarget::new("https://example.com", "example.com"))
            .await
            .unwrap();

        assert_eq!(
            result.detail,
            CollectorDetail::Geolocation {
                country: "United States".to_string(),
                isp: "Edgecast Inc.".to_string(),
                organization: "Unknown".to_string(),
            }
        );
        assert!(result.threats.is_empty());
    }

    #[tokio::test]
    async fn test_slow_api_times_out_to_default() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"country_name": "Nowhere"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let collector = GeolocationCollector::new(Client::new(), Some("geo-key".to_string()))
            .with_base_url(&mock_server.uri());
        let result = run_collector(
            &collector,
            &ScanTarget::new("https://example.com", "example.com"),
            Duration::from_millis(200),
        )
        .await;

        assert!(!result.is_available());
        assert_eq!(
            result.detail,
            CollectorDetail::safe_default(CollectorKind::Geolocation)
        );
    }
}
