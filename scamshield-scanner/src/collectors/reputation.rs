// Engine-vote reputation lookup (VirusTotal URL report API)

use super::{decode_json, require_key, trim_base};
use crate::collector::{Collector, ScanTarget};
use crate::error::Result;
use crate::result::{CollectorDetail, CollectorKind, CollectorResult};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com";

#[derive(Debug, Deserialize)]
struct ReputationResponse {
    #[serde(default)]
    positives: u32,
    #[serde(default)]
    total: u32,
    scan_date: Option<String>,
}

pub struct ReputationCollector {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl ReputationCollector {
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
        let api_key = require_key(&self.api_key, "reputation")?;

        let response = self
            .client
            .get(format!("{}/vtapi/v2/url/report", self.base_url))
            .query(&[("apikey", api_key), ("resource", target.url.as_str())])
            .send()
            .await?;
        let body: ReputationResponse = decode_json(response).await?;

        let mut result = CollectorResult::new(
            CollectorKind::Reputation,
            CollectorDetail::Reputation {
                positives: body.positives,
                total: body.total,
                scan_date: body.scan_date,
            },
        );

        if body.positives > 0 {
            result = result.with_threat(format!(
                "Flagged as malicious by {}/{} security engines",
                body.positives, body.total
            ));
        }

        Ok(result)
    }
}

impl Collector for ReputationCollector {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Reputation
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

    fn target() -> ScanTarget {
        ScanTarget::new("http://evil.example/login", "evil.example")
    }

    #[tokio::test]
    async fn test_positives_produce_threat() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vtapi/v2/url/report"))
            .and(query_param("apikey", "vt-key"))
            .and(query_param("resource", "http://evil.example/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "positives": 7,
                "total": 70,
                "scan_date": "2026-01-02 03:04:05"
            })))
            .mount(&mock_server)
            .await;

        let collector = ReputationCollector::new(Client::new(), Some("vt-key".to_string()))
            .with_base_url(&mock_server.uri());
        let result = collector.query(&target()).await.unwrap();

        assert!(result.threat_found);
        assert_eq!(
            result.threats,
            vec!["Flagged as malicious by 7/70 security engines"]
        );
        assert_eq!(
            result.detail,
            CollectorDetail::Reputation {
                positives: 7,
                total: 70,
                scan_date: Some("2026-01-02 03:04:05".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_clean_url_has_no_threats() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vtapi/v2/url/report"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"positives": 0, "total": 65})),
            )
            .mount(&mock_server)
            .await;

        let collector = ReputationCollector::new(Client::new(), Some("vt-key".to_string()))
            .with_base_url(&mock_server.uri());
        let result = collector.query(&target()).await.unwrap();

        assert!(!result.threat_found);
        assert!(result.threats.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_degrades() {
        let collector = ReputationCollector::new(Client::new(), None);
        let result = run_collector(&collector, &target(), Duration::from_secs(1)).await;

        assert!(!result.is_available());
        assert_eq!(
            result.detail,
            CollectorDetail::safe_default(CollectorKind::Reputation)
        );
    }

    #[tokio::test]
    async fn test_server_error_degrades() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let collector = ReputationCollector::new(Client::new(), Some("bad".to_string()))
            .with_base_url(&mock_server.uri());
        let result = run_collector(&collector, &target(), Duration::from_secs(5)).await;

        assert!(!result.is_available());
        assert!(result.error.unwrap().contains("403"));
    }

    #[tokio::test]
    async fn test_malformed_json_degrades() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&mock_server)
            .await;

        let collector = ReputationCollector::new(Client::new(), Some("vt-key".to_string()))
            .with_base_url(&mock_server.uri());
        let result = run_collector(&collector, &target(), Duration::from_secs(5)).await;

        assert!(!result.is_available());
        assert!(result.error.unwrap().starts_with("Parse error"));
    }
}
