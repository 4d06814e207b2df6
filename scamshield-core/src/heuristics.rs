// Local heuristic scorers. Pure functions of the URL and domain, no I/O.

use crate::config::HeuristicConfig;
use crate::error::{CoreError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const PHISHING_THREAT: &str = "High probability of phishing";
pub const MALWARE_THREAT: &str = "Malware distribution pattern detected";
pub const SUSPICIOUS_THREAT: &str = "Suspicious behavioral patterns detected";

/// Sub-scores feeding the phishing composite, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhishingComponents {
    pub homograph: f64,
    pub brand_impersonation: f64,
    pub url_structure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeuristicScore {
    pub phishing: f64,
    pub malware: f64,
    pub suspicious: f64,
    pub components: PhishingComponents,
    pub threats: Vec<String>,
}

impl HeuristicScore {
    /// Largest of the three category scores.
    pub fn overall_risk(&self) -> f64 {
        self.phishing.max(self.malware).max(self.suspicious)
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| CoreError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn clamp_unit(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

pub struct HeuristicEngine {
    config: HeuristicConfig,
    homograph_patterns: Vec<(Regex, f64)>,
    ip_pattern: Regex,
}

impl HeuristicEngine {
    pub fn new(config: HeuristicConfig) -> Result<Self> {
        let homograph_patterns = config
            .homograph_patterns
            .iter()
            .map(|p| Ok((compile(&p.pattern)?, p.weight)))
            .collect::<Result<Vec<_>>>()?;
        let ip_pattern = compile(&config.ip_pattern)?;

        Ok(Self {
            config,
            homograph_patterns,
            ip_pattern,
        })
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Sum of matched pattern weights divided by the number of patterns.
    pub fn homograph_score(&self, domain: &str) -> f64 {
        if self.homograph_patterns.is_empty() {
            return 0.0;
        }

        let matched: f64 = self
            .homograph_patterns
            .iter()
            .filter(|(pattern, _)| pattern.is_match(domain))
            .map(|(_, weight)| weight)
            .sum();

        matched / self.homograph_patterns.len() as f64
    }

    pub fn brand_impersonation_score(&self, domain: &str) -> f64 {
        let domain = domain.to_lowercase();
        let mut score = 0.0;

        for brand in &self.config.brands {
            if !domain.contains(&brand.name) {
                continue;
            }
            let official = brand
                .official_domains
                .iter()
                .any(|d| domain == *d || domain.ends_with(&format!(".{}", d)));
            if !official {
                score += self.config.brand_weight;
            }
        }

        clamp_unit(score)
    }

    pub fn url_structure_score(&self, url: &str, domain: &str) -> f64 {
        let mut score = 0.0;

        let subdomains = domain.split('.').count().saturating_sub(2);
        if subdomains > self.config.subdomain_limit {
            score += self.config.subdomain_weight;
        }

        if self.ip_pattern.is_match(url) {
            score += self.config.ip_weight;
        }

        let domain = domain.to_lowercase();
        if self
            .config
            .suspicious_tlds
            .iter()
            .any(|tld| domain.ends_with(tld.as_str()))
        {
            score += self.config.tld_weight;
        }

        clamp_unit(score)
    }

    pub fn phishing_components(&self, url: &str, domain: &str) -> PhishingComponents {
        PhishingComponents {
            homograph: self.homograph_score(domain),
            brand_impersonation: self.brand_impersonation_score(domain),
            url_structure: self.url_structure_score(url, domain),
        }
    }

    pub fn phishing_score(&self, components: &PhishingComponents) -> f64 {
        let weights = &self.config.phishing_weights;
        clamp_unit(
            weights.homograph * components.homograph
                + weights.brand_impersonation * components.brand_impersonation
                + weights.url_structure * components.url_structure,
        )
    }

    pub fn malware_score(&self, url: &str) -> f64 {
        let url = url.to_lowercase();
        let mut score = 0.0;

        if self
            .config
            .executable_extensions
            .iter()
            .any(|ext| url.contains(ext.as_str()))
        {
            score += self.config.executable_weight;
        }
        if self
            .config
            .parameter_keywords
            .iter()
            .any(|kw| url.contains(kw.as_str()))
        {
            score += self.config.parameter_weight;
        }

        clamp_unit(score)
    }

    pub fn behavioral_score(&self, url: &str) -> f64 {
        let mut score = 0.0;
        let length = url.chars().count();

        if length > self.config.long_url_length {
            score += self.config.long_url_weight;
        }

        if length > 0 {
            let special = url
                .chars()
                .filter(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
                .count();
            if special as f64 / length as f64 > self.config.special_char_ratio {
                score += self.config.special_char_weight;
            }
        }

        if url.contains('%') || url.contains("&amp;") {
            score += self.config.encoding_weight;
        }

        clamp_unit(score)
    }

    /// Runs every scorer and collects the flagged categories as threats.
    pub fn evaluate(&self, url: &str, domain: &str) -> HeuristicScore {
        let components = self.phishing_components(url, domain);
        let phishing = self.phishing_score(&components);
        let malware = self.malware_score(url);
        let suspicious = self.behavioral_score(url);

        let mut threats = Vec::new();
        if phishing > self.config.phishing_threshold {
            threats.push(PHISHING_THREAT.to_string());
        }
        if malware > self.config.malware_threshold {
            threats.push(MALWARE_THREAT.to_string());
        }
        if suspicious > self.config.suspicious_threshold {
            threats.push(SUSPICIOUS_THREAT.to_string());
        }

        HeuristicScore {
            phishing,
            malware,
            suspicious,
            components,
            threats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HeuristicEngine {
        HeuristicEngine::new(HeuristicConfig::default()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_homograph_clean_domain() {
        assert!(approx(engine().homograph_score("example.com"), 0.1));
        assert!(approx(engine().homograph_score("bing.net"), 0.0));
    }

    #[test]
    fn test_homograph_cyrillic() {
        // Cyrillic "а" in place of Latin "a"
        assert!(approx(engine().homograph_score("pаypal.com"), (0.9 + 0.5) / 5.0));
    }

    #[test]
    fn test_brand_official_domain_not_flagged() {
        let engine = engine();
        assert!(approx(engine.brand_impersonation_score("google.com"), 0.0));
        assert!(approx(engine.brand_impersonation_score("mail.google.com"), 0.0));
        assert!(approx(engine.brand_impersonation_score("notgoogle.com"), 0.3));
    }

    #[test]
    fn test_brand_score_clamped() {
        let score = engine()
            .brand_impersonation_score("google-facebook-amazon-apple-paypal.bank.tk");
        assert!(approx(score, 1.0));
    }

    #[test]
    fn test_subdomain_depth() {
        let engine = engine();
        assert!(approx(engine.url_structure_score("http://a.b.c.example.com", "a.b.c.example.com"), 0.0));
        assert!(approx(
            engine.url_structure_score("http://a.b.c.d.example.com", "a.b.c.d.example.com"),
            0.3
        ));
    }

    #[test]
    fn test_malware_split() {
        let engine = engine();
        assert!(approx(engine.malware_score("http://x.com/app.APK"), 0.6));
        assert!(approx(engine.malware_score("http://x.com/?download=1"), 0.4));
        assert!(approx(engine.malware_score("http://x.com/setup.exe"), 1.0));
        assert!(approx(engine.malware_score("http://x.com/"), 0.0));
    }

    #[test]
    fn test_behavioral_checks() {
        let engine = engine();
        assert!(approx(engine.behavioral_score("example.com"), 0.0));
        assert!(approx(engine.behavioral_score("a%20b"), 0.2));
        let long = format!("http://example.com/{}", "a".repeat(120));
        assert!(approx(engine.behavioral_score(&long), 0.2));
        assert!(approx(engine.behavioral_score("?/=&?/=&ab"), 0.3));
        assert!(approx(engine.behavioral_score(""), 0.0));
    }

    #[test]
    fn test_evaluate_flags_malware() {
        let score = engine().evaluate("http://files.example/setup.exe", "files.example");
        assert!(score.malware > 0.6);
        assert_eq!(score.threats, vec![MALWARE_THREAT.to_string()]);
        assert!(approx(score.overall_risk(), score.malware));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = HeuristicConfig::default();
        config.ip_pattern = "(".to_string();
        assert!(matches!(
            HeuristicEngine::new(config),
            Err(CoreError::Pattern { .. })
        ));
    }
}
