// Input classification: scanned content is either a URL or free text

use scamshield_scanner::ScanTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::{Host, Url};

/// Sentinel domain for URLs without a usable host.
pub const INVALID_DOMAIN: &str = "Invalid URL";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub fn invalid() -> Self {
        Domain(INVALID_DOMAIN.to_string())
    }

    fn from_host(host: &str) -> Self {
        Domain(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 != INVALID_DOMAIN
    }

    /// Punycode form for DNS and API lookups.
    pub fn to_ascii(&self) -> String {
        idna::domain_to_ascii(&self.0).unwrap_or_else(|_| self.0.clone())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    Url { url: String, domain: Domain },
    Text(String),
}

impl ScanInput {
    pub fn subject(&self) -> &str {
        match self {
            ScanInput::Url { url, .. } => url,
            ScanInput::Text(text) => text,
        }
    }

    pub fn domain(&self) -> Option<&Domain> {
        match self {
            ScanInput::Url { domain, .. } => Some(domain),
            ScanInput::Text(_) => None,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ScanInput::Url { .. })
    }

    /// The collector query for URL inputs.
    pub fn target(&self) -> Option<ScanTarget> {
        match self {
            ScanInput::Url { url, domain } => Some(ScanTarget::new(url.as_str(), domain.to_ascii())),
            ScanInput::Text(_) => None,
        }
    }
}

/// Classifies raw scanned content. Pure and deterministic.
pub fn classify(raw: &str) -> ScanInput {
    match Url::parse(raw) {
        Ok(parsed) => ScanInput::Url {
            url: raw.to_string(),
            domain: domain_of(&parsed),
        },
        Err(_) => ScanInput::Text(raw.to_string()),
    }
}

/// Host of `url` in Unicode form without a leading "www.", or the sentinel
/// when there is none.
pub fn extract_domain(url: &str) -> Domain {
    Url::parse(url)
        .map(|parsed| domain_of(&parsed))
        .unwrap_or_else(|_| Domain::invalid())
}

fn domain_of(parsed: &Url) -> Domain {
    match parsed.host() {
        None | Some(Host::Domain("")) => Domain::invalid(),
        Some(Host::Domain(host)) => {
            // The parser hands back punycode; lookalike checks need the glyphs
            let (unicode, outcome) = idna::domain_to_unicode(host);
            match outcome {
                Ok(()) => Domain::from_host(&unicode),
                Err(_) => Domain::from_host(host),
            }
        }
        Some(ip) => Domain::from_host(&ip.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_url_strips_www() {
        let input = classify("https://www.example.com/login?next=1");
        assert_eq!(
            input,
            ScanInput::Url {
                url: "https://www.example.com/login?next=1".to_string(),
                domain: Domain("example.com".to_string()),
            }
        );
    }

    #[test]
    fn test_classify_text_keeps_raw() {
        let raw = "  Congratulations you won a free lottery prize! ";
        assert_eq!(classify(raw), ScanInput::Text(raw.to_string()));
    }

    #[test]
    fn test_hostless_url_gets_sentinel() {
        let input = classify("mailto:someone@example.com");
        assert!(input.is_url());
        assert_eq!(input.domain(), Some(&Domain::invalid()));
        assert!(!input.domain().unwrap().is_valid());
    }

    #[test]
    fn test_extract_domain_invalid() {
        assert_eq!(extract_domain("not a url"), Domain::invalid());
        assert_eq!(extract_domain("http://WWW.Example.COM").as_str(), "example.com");
    }

    #[test]
    fn test_classify_keeps_cyrillic_host() {
        let input = classify("https://www.p\u{0430}ypal.com/login");
        let domain = input.domain().unwrap();

        assert_eq!(domain.as_str(), "p\u{0430}ypal.com");
        assert_eq!(domain.to_ascii(), "xn--pypal-4ve.com");
        assert_eq!(input.target().unwrap().domain, "xn--pypal-4ve.com");
    }

    #[test]
    fn test_punycode_input_is_decoded() {
        assert_eq!(
            extract_domain("https://xn--pypal-4ve.com/").as_str(),
            "p\u{0430}ypal.com"
        );
    }

    #[test]
    fn test_ascii_form_of_plain_domain_is_unchanged() {
        assert_eq!(extract_domain("https://example.com").to_ascii(), "example.com");
        assert_eq!(extract_domain("http://[::1]:8080/").as_str(), "[::1]");
    }

    #[test]
    fn test_target_only_for_urls() {
        assert!(classify("hello there").target().is_none());
        let target = classify("http://192.168.1.1/login").target().unwrap();
        assert_eq!(target.domain, "192.168.1.1");
        assert_eq!(target.url, "http://192.168.1.1/login");
    }
}
