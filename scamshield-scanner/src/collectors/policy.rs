// Threat-list policy match (Google Safe Browsing v4 Lookup API)

use super::{decode_json, require_key, trim_base};
use crate::collector::{Collector, ScanTarget};
use crate::error::Result;
use crate::result::{CollectorDetail, CollectorKind, CollectorResult};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

pub const DEFAULT_BASE_URL: &str = "https://safebrowsing.googleapis.com";

pub const CLIENT_ID: &str = "scamshield";

pub const THREAT_TYPES: [&str; 4] = [
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

pub const PLATFORM_TYPES: [&str; 1] = ["ANY_PLATFORM"];

#[derive(Debug, Deserialize)]
struct ThreatMatchesResponse {
    matches: Option<Vec<ThreatMatch>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreatMatch {
    threat_type: String,
}

/// Lookup request body for a single URL.
pub fn build_request_body(url: &str) -> Value {
    json!({
        "client": {
            "clientId": CLIENT_ID,
            "clientVersion": env!("CARGO_PKG_VERSION"),
        },
        "threatInfo": {
            "threatTypes": THREAT_TYPES,
            "platformTypes": PLATFORM_TYPES,
            "threatEntryTypes": ["URL"],
            "threatEntries": [{ "url": url }],
        }
    })
}

pub struct PolicyMatchCollector {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PolicyMatchCollector {
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
        let api_key = require_key(&self.api_key, "policy_match")?;

        let response = self
            .client
            .post(format!("{}/v4/threatMatches:find", self.base_url))
            .query(&[("key", api_key)])
            .json(&build_request_body(&target.url))
            .send()
            .await?;
        let body: ThreatMatchesResponse = decode_json(response).await?;

        let categories: Vec<String> = body
            .matches
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.threat_type)
            .collect();

        let mut result = CollectorResult::new(
            CollectorKind::PolicyMatch,
            CollectorDetail::PolicyMatch {
                matched: !categories.is_empty(),
                categories: categories.clone(),
            },
        );
        for category in &categories {
            result = result.with_threat(format!("Safe Browsing lists this URL as {}", category));
        }

        Ok(result)
    }
}

impl Collector for PolicyMatchCollector {
    fn kind(&self) -> CollectorKind {
        CollectorKind::PolicyMatch
    }

    fn query<'a>(&'a self, target: &'a ScanTarget) -> BoxFuture<'a, Result<CollectorResult>> {
        Box::pin(self.fetch(target))
    }
}
