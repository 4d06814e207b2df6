use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SslStatus {
    /// The HTTPS probe got a successful response.
    Valid,
    /// The probe completed but the server answered with a failure status.
    Invalid,
    /// The probe itself errored (DNS, TLS handshake, timeout).
    Unknown,
}

impl SslStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslStatus::Valid => "Valid",
            SslStatus::Invalid => "Invalid",
            SslStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SslStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal HTTPS existence check. Informational only.
pub struct SslProbe {
    client: Client,
}

impl SslProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Probes `https://{domain}/`. Domains that do not form a valid URL are `Unknown`.
    pub async fn probe(&self, domain: &str) -> SslStatus {
        match Url::parse(&format!("https://{}/", domain)) {
            Ok(url) => self.probe_url(url.as_str()).await,
            Err(e) => {
                debug!("Not probing '{}': {}", domain, e);
                SslStatus::Unknown
            }
        }
    }

    pub async fn probe_url(&self, url: &str) -> SslStatus {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => SslStatus::Valid,
            Ok(response) => {
                debug!("Probe of {} answered {}", url, response.status());
                SslStatus::Invalid
            }
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                SslStatus::Unknown
            }
        }
    }
}
