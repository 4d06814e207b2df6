// Threat-intelligence API clients, one per signal source

pub mod geolocation;
pub mod policy;
pub mod registration;
pub mod reputation;

pub use geolocation::GeolocationCollector;
pub use policy::PolicyMatchCollector;
pub use registration::RegistrationCollector;
pub use reputation::ReputationCollector;

use crate::error::{Result, ScanError};
use reqwest::Response;
use serde::de::DeserializeOwned;

pub(crate) fn require_key<'a>(key: &'a Option<String>, source: &'static str) -> Result<&'a str> {
    match key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(ScanError::MissingCredential(source)),
    }
}

/// Rejects non-2xx responses and decodes the body as `T`.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ScanError::ParseError(e.to_string()))
}

pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Empty strings from an API count as missing.
pub(crate) fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| crate::result::UNKNOWN.to_string())
}
