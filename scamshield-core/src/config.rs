// Scan configuration: credentials, endpoints and every heuristic constant

use crate::error::{CoreError, Result};
use scamshield_scanner::collectors::{geolocation, policy, registration, reputation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/scamshield/config.json";

/// One API key per collector. A missing key disables that source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCredentials {
    pub reputation: Option<String>,
    pub registration: Option<String>,
    pub geolocation: Option<String>,
    pub policy_match: Option<String>,
}

impl ApiCredentials {
    /// Replaces each key that `other` provides; keeps the rest.
    pub fn overlay(&mut self, other: ApiCredentials) {
        if other.reputation.is_some() {
            self.reputation = other.reputation;
        }
        if other.registration.is_some() {
            self.registration = other.registration;
        }
        if other.geolocation.is_some() {
            self.geolocation = other.geolocation;
        }
        if other.policy_match.is_some() {
            self.policy_match = other.policy_match;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub reputation: String,
    pub registration: String,
    pub geolocation: String,
    pub policy_match: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            reputation: reputation::DEFAULT_BASE_URL.to_string(),
            registration: registration::DEFAULT_BASE_URL.to_string(),
            geolocation: geolocation::DEFAULT_BASE_URL.to_string(),
            policy_match: policy::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPattern {
    pub pattern: String,
    pub weight: f64,
}

impl WeightedPattern {
    fn new(pattern: &str, weight: f64) -> Self {
        Self {
            pattern: pattern.to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRule {
    pub name: String,
    pub official_domains: Vec<String>,
}

impl BrandRule {
    fn new(name: &str, official_domains: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            official_domains: strings(official_domains),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhishingWeights {
    pub homograph: f64,
    pub brand_impersonation: f64,
    pub url_structure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCategory {
    pub pattern: String,
    pub score: u8,
    pub threat: String,
}

impl TextCategory {
    fn new(pattern: &str, score: u8, threat: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            score,
            threat: threat.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAnalysisConfig {
    pub baseline_score: u8,
    /// Checked in priority order.
    pub categories: Vec<TextCategory>,
}

impl Default for TextAnalysisConfig {
    fn default() -> Self {
        Self {
            baseline_score: 10,
            categories: vec![
                TextCategory::new(
                    r"(?i)\b(fraud|scam|phishing|malicious|virus|trojan)\b",
                    80,
                    "Contains fraud or malware related terms",
                ),
                TextCategory::new(
                    r"(?i)\b(password|passcode|otp|pin|cvv|ssn|login|bank account|account number|credit card|debit card|verify your account)\b",
                    60,
                    "Requests credentials or banking information",
                ),
                TextCategory::new(
                    r"(?i)\b(bitcoin|btc|crypto|cryptocurrency|ethereum|usdt|wallet|investment|invest|guaranteed returns?)\b",
                    50,
                    "Mentions cryptocurrency or investment schemes",
                ),
                TextCategory::new(
                    r"(?i)\b(lottery|prize|winner|won|jackpot|congratulations|reward|free gift)\b",
                    40,
                    "Promises prizes or lottery winnings",
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub homograph_patterns: Vec<WeightedPattern>,

    pub brands: Vec<BrandRule>,
    pub brand_weight: f64,

    pub subdomain_limit: usize,
    pub subdomain_weight: f64,
    pub ip_pattern: String,
    pub ip_weight: f64,
    pub suspicious_tlds: Vec<String>,
    pub tld_weight: f64,

    pub phishing_weights: PhishingWeights,

    pub executable_extensions: Vec<String>,
    pub executable_weight: f64,
    pub parameter_keywords: Vec<String>,
    pub parameter_weight: f64,

    pub long_url_length: usize,
    pub long_url_weight: f64,
    pub special_char_ratio: f64,
    pub special_char_weight: f64,
    pub encoding_weight: f64,

    pub phishing_threshold: f64,
    pub malware_threshold: f64,
    pub suspicious_threshold: f64,

    pub text: TextAnalysisConfig,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            homograph_patterns: vec![
                WeightedPattern::new("rn", 0.8),
                WeightedPattern::new("cl", 0.7),
                WeightedPattern::new(r"[\x{0400}-\x{04FF}]", 0.9),
                WeightedPattern::new(r"[0-9]", 0.6),
                WeightedPattern::new("[o0]", 0.5),
            ],
            brands: vec![
                BrandRule::new("google", &["google.com", "youtube.com", "gmail.com"]),
                BrandRule::new("facebook", &["facebook.com", "fb.com"]),
                BrandRule::new("amazon", &["amazon.com", "amazon.in", "amazon.co.uk"]),
                BrandRule::new("apple", &["apple.com", "icloud.com"]),
                BrandRule::new(
                    "microsoft",
                    &["microsoft.com", "live.com", "outlook.com", "office.com"],
                ),
                BrandRule::new("netflix", &["netflix.com"]),
                BrandRule::new("paypal", &["paypal.com", "paypal.me"]),
                BrandRule::new("bank", &[]),
                BrandRule::new("whatsapp", &["whatsapp.com", "whatsapp.net"]),
                BrandRule::new("instagram", &["instagram.com"]),
                BrandRule::new("twitter", &["twitter.com", "x.com"]),
            ],
            brand_weight: 0.3,

            subdomain_limit: 3,
            subdomain_weight: 0.3,
            ip_pattern: r"\b(?:\d{1,3}\.){3}\d{1,3}\b".to_string(),
            ip_weight: 0.4,
            suspicious_tlds: strings(&[".tk", ".ml", ".ga", ".cf", ".xyz", ".top"]),
            tld_weight: 0.3,

            phishing_weights: PhishingWeights {
                homograph: 0.3,
                brand_impersonation: 0.4,
                url_structure: 0.3,
            },

            executable_extensions: strings(&[".exe", ".dmg", ".apk", ".bat", ".cmd", ".scr"]),
            executable_weight: 0.6,
            parameter_keywords: strings(&["download", "install", "setup", "cmd", "exec"]),
            parameter_weight: 0.4,

            long_url_length: 100,
            long_url_weight: 0.2,
            special_char_ratio: 0.3,
            special_char_weight: 0.3,
            encoding_weight: 0.2,

            phishing_threshold: 0.7,
            malware_threshold: 0.6,
            suspicious_threshold: 0.5,

            text: TextAnalysisConfig::default(),
        }
    }
}

/// How collector and heuristic signals turn into the 0-100 risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationWeights {
    pub reputation: f64,
    pub policy_match: f64,
    pub heuristics: f64,
}

impl Default for AggregationWeights {
    fn default() -> Self {
        Self {
            reputation: 40.0,
            policy_match: 30.0,
            heuristics: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub credentials: ApiCredentials,
    pub endpoints: ApiEndpoints,
    pub collector_timeout_secs: u64,
    pub probe_ssl: bool,
    pub offline: bool,
    pub heuristics: HeuristicConfig,
    pub weights: AggregationWeights,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            credentials: ApiCredentials::default(),
            endpoints: ApiEndpoints::default(),
            collector_timeout_secs: 10,
            probe_ssl: true,
            offline: false,
            heuristics: HeuristicConfig::default(),
            weights: AggregationWeights::default(),
        }
    }
}

impl ScanConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_secs(self.collector_timeout_secs.max(1))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = HeuristicConfig::default();
        let weights: Vec<f64> = config.homograph_patterns.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![0.8, 0.7, 0.9, 0.6, 0.5]);
        assert_eq!(config.brands.len(), 11);
        assert_eq!(config.suspicious_tlds.len(), 6);
        assert_eq!(config.text.categories.len(), 4);
        assert_eq!(config.text.baseline_score, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ScanConfig::from_json(
            r#"{"credentials": {"reputation": "vt"}, "collector_timeout_secs": 3}"#,
        )
        .unwrap();

        assert_eq!(config.credentials.reputation.as_deref(), Some("vt"));
        assert_eq!(config.credentials.geolocation, None);
        assert_eq!(config.collector_timeout(), Duration::from_secs(3));
        assert_eq!(config.heuristics, HeuristicConfig::default());
        assert_eq!(config.weights, AggregationWeights::default());
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let config = ScanConfig::default();
        let parsed = ScanConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_overlay_only_replaces_present_keys() {
        let mut base = ApiCredentials {
            reputation: Some("file-vt".to_string()),
            geolocation: Some("file-geo".to_string()),
            ..Default::default()
        };
        base.overlay(ApiCredentials {
            reputation: Some("flag-vt".to_string()),
            ..Default::default()
        });

        assert_eq!(base.reputation.as_deref(), Some("flag-vt"));
        assert_eq!(base.geolocation.as_deref(), Some("file-geo"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScanConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigIo { .. }));
    }
}
