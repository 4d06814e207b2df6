use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorKind {
    Reputation,
    Registration,
    Geolocation,
    PolicyMatch,
}

impl CollectorKind {
    pub const ALL: [CollectorKind; 4] = [
        CollectorKind::Reputation,
        CollectorKind::Registration,
        CollectorKind::Geolocation,
        CollectorKind::PolicyMatch,
    ];

    /// Sources queried by domain name rather than by full URL.
    pub fn is_domain_keyed(&self) -> bool {
        matches!(self, CollectorKind::Registration | CollectorKind::Geolocation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectorKind::Reputation => "reputation",
            CollectorKind::Registration => "registration",
            CollectorKind::Geolocation => "geolocation",
            CollectorKind::PolicyMatch => "policy_match",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-specific payload of a collector result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectorDetail {
    Reputation {
        positives: u32,
        total: u32,
        scan_date: Option<String>,
    },
    Registration {
        domain_age_days: Option<i64>,
        registrar: String,
    },
    Geolocation {
        country: String,
        isp: String,
        organization: String,
    },
    PolicyMatch {
        matched: bool,
        categories: Vec<String>,
    },
}

impl CollectorDetail {
    /// The neutral payload substituted when a source cannot answer.
    pub fn safe_default(kind: CollectorKind) -> Self {
        match kind {
            CollectorKind::Reputation => CollectorDetail::Reputation {
                positives: 0,
                total: 0,
                scan_date: None,
            },
            CollectorKind::Registration => CollectorDetail::Registration {
                domain_age_days: None,
                registrar: UNKNOWN.to_string(),
            },
            CollectorKind::Geolocation => CollectorDetail::Geolocation {
                country: UNKNOWN.to_string(),
                isp: UNKNOWN.to_string(),
                organization: UNKNOWN.to_string(),
            },
            CollectorKind::PolicyMatch => CollectorDetail::PolicyMatch {
                matched: false,
                categories: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorResult {
    pub source: CollectorKind,
    pub threat_found: bool,
    pub detail: CollectorDetail,
    pub threats: Vec<String>,
    pub response_time: Duration,
    /// Set when the source was unreachable and `detail` is the safe default.
    pub error: Option<String>,
    /// The source was never queried for this target.
    #[serde(default)]
    pub skipped: bool,
}

impl CollectorResult {
    pub fn new(source: CollectorKind, detail: CollectorDetail) -> Self {
        Self {
            source,
            threat_found: false,
            detail,
            threats: Vec::new(),
            response_time: Duration::from_secs(0),
            error: None,
            skipped: false,
        }
    }

    pub fn with_error(source: CollectorKind, error: String) -> Self {
        Self {
            source,
            threat_found: false,
            detail: CollectorDetail::safe_default(source),
            threats: Vec::new(),
            response_time: Duration::from_secs(0),
            error: Some(error),
            skipped: false,
        }
    }

    pub fn skipped(source: CollectorKind, reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            ..Self::with_error(source, reason.into())
        }
    }

    pub fn with_threat(mut self, description: impl Into<String>) -> Self {
        self.threat_found = true;
        self.threats.push(description.into());
        self
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}
