// Domain registration metadata (WhoisXML API)

use super::{decode_json, or_unknown, require_key, trim_base};
use crate::collector::{Collector, ScanTarget};
use crate::error::Result;
use crate::result::{CollectorDetail, CollectorKind, CollectorResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.whoisxmlapi.com";

#[derive(Debug, Deserialize)]
struct WhoisResponse {
    #[serde(rename = "WhoisRecord")]
    whois_record: Option<WhoisRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhoisRecord {
    created_date: Option<String>,
    registrar_name: Option<String>,
    registry_data: Option<RegistryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryData {
    created_date: Option<String>,
}

/// Parses the loosely formatted creation dates WHOIS sources return.
pub fn parse_created_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

pub fn domain_age_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created).num_days().max(0)
}

pub struct RegistrationCollector {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl RegistrationCollector {
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
        let api_key = require_key(&self.api_key, "registration")?;

        let response = self
            .client
            .get(format!("{}/whoisserver/WhoisService", self.base_url))
            .query(&[
                ("apiKey", api_key),
                ("domainName", target.domain.as_str()),
                ("outputFormat", "JSON"),
            ])
            .send()
            .await?;
        let body: WhoisResponse = decode_json(response).await?;

        let (created, registrar) = match body.whois_record {
            Some(record) => {
                let created = record
                    .created_date
                    .or_else(|| record.registry_data.and_then(|r| r.created_date));
                (created, record.registrar_name)
            }
            None => (None, None),
        };

        let domain_age_days = created
            .as_deref()
            .and_then(parse_created_date)
            .map(|created| domain_age_days(created, Utc::now()));

        Ok(CollectorResult::new(
            CollectorKind::Registration,
            CollectorDetail::Registration {
                domain_age_days,
                registrar: or_unknown(registrar),
            },
        ))
    }
}

impl Collector for RegistrationCollector {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Registration
    }

    fn query<'a>(&'a self, target: &'a ScanTarget) -> BoxFuture<'a, Result<CollectorResult>> {
        Box::pin(self.fetch(target))
    }
}
