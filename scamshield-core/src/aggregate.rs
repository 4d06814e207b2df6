// Combines collector results and heuristic scores into a SecurityReport

use crate::classify::Domain;
use crate::config::{AggregationWeights, HeuristicConfig};
use crate::heuristics::HeuristicScore;
use crate::report::{
    ANALYSIS_UNAVAILABLE, InputKind, RiskLevel, SecurityReport, SourceEntry, SourceStatus, UNKNOWN,
};
use crate::text::TextAnalysis;
use chrono::Utc;
use scamshield_scanner::{CollectorDetail, CollectorKind, CollectorResult, SslStatus};
use tracing::warn;
use uuid::Uuid;

pub const REPUTATION_BLOCK: &str =
    "Security engines flagged this URL as malicious. Do not open it.";
pub const POLICY_BLOCK: &str =
    "Safe Browsing lists this URL as dangerous. Do not open it or download anything from it.";
pub const PHISHING_WARNING: &str =
    "This looks like a phishing site. Never enter passwords, OTPs or payment details here.";
pub const MALWARE_WARNING: &str =
    "This URL may deliver malware. Do not download or install anything from it.";
pub const NO_OBVIOUS_THREATS: &str =
    "No obvious threats detected. Stay cautious with personal information.";
pub const TEXT_DO_NOT_ENGAGE: &str =
    "Do not reply, click links, or share passwords, PINs or banking details.";
pub const TEXT_VERIFY_SENDER: &str =
    "Verify the sender through an official channel before acting on this message.";

pub const HEURISTICS_SOURCE: &str = "heuristics";
pub const TEXT_SOURCE: &str = "text_analysis";

fn to_risk_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

pub struct Aggregator {
    weights: AggregationWeights,
    phishing_threshold: f64,
    malware_threshold: f64,
}

impl Aggregator {
    pub fn new(weights: AggregationWeights) -> Self {
        Self::with_thresholds(weights, &HeuristicConfig::default())
    }

    /// Warnings follow the same thresholds the heuristic engine flags threats at.
    pub fn with_thresholds(weights: AggregationWeights, heuristics: &HeuristicConfig) -> Self {
        Self {
            weights,
            phishing_threshold: heuristics.phishing_threshold,
            malware_threshold: heuristics.malware_threshold,
        }
    }

    pub fn weights(&self) -> &AggregationWeights {
        &self.weights
    }

    /// Full report for a URL. Falls back to [`Aggregator::local_only`] when no collector answered.
    pub fn aggregate(
        &self,
        url: &str,
        domain: &Domain,
        collectors: &[CollectorResult],
        heuristics: &HeuristicScore,
        ssl: SslStatus,
    ) -> SecurityReport {
        if collectors.iter().all(|c| !c.is_available()) {
            warn!("No collector answered for {}; using local heuristics only", url);
            return self.local_only(url, domain, collectors, heuristics);
        }

        let mut breakdown = Vec::with_capacity(collectors.len() + 1);
        let mut score = 0.0;
        let mut reputation_counted = false;
        let mut engines_flagged = false;
        let mut policy_matched = false;

        for result in collectors {
            let mut points = 0.0;
            if result.is_available() {
                match &result.detail {
                    CollectorDetail::Reputation {
                        positives, total, ..
                    } if !reputation_counted => {
                        reputation_counted = true;
                        if *total > 0 {
                            points = f64::from(*positives) / f64::from(*total)
                                * self.weights.reputation;
                        }
                        engines_flagged = *positives > 0;
                    }
                    CollectorDetail::PolicyMatch { matched: true, .. } if !policy_matched => {
                        policy_matched = true;
                        points = self.weights.policy_match;
                    }
                    _ => {}
                }
            }
            score += points;
            breakdown.push(source_entry(result, points));
        }

        let heuristic_points = heuristics.overall_risk() * self.weights.heuristics;
        score += heuristic_points;
        breakdown.push(SourceEntry {
            source: HEURISTICS_SOURCE.to_string(),
            status: SourceStatus::Ok,
            points: heuristic_points,
        });

        let mut recommendations = Vec::new();
        if engines_flagged {
            recommendations.push(REPUTATION_BLOCK.to_string());
        }
        if policy_matched {
            recommendations.push(POLICY_BLOCK.to_string());
        }
        self.heuristic_recommendations(heuristics, &mut recommendations);

        let risk_score = to_risk_score(score);
        let (domain_age, registrar) = registration_fields(collectors);
        let (country, isp) = geolocation_fields(collectors);

        SecurityReport {
            scan_id: Uuid::new_v4(),
            scanned_at: Utc::now(),
            subject: url.to_string(),
            input_kind: InputKind::Url,
            domain: Some(domain.to_string()),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            domain_age: Some(domain_age),
            registrar: Some(registrar),
            country: Some(country),
            isp: Some(isp),
            ssl_status: Some(ssl.to_string()),
            threats_detected: collect_threats(collectors, heuristics),
            recommendations,
            source_breakdown: breakdown,
            degraded: false,
        }
    }

    /// Heuristic-only report used when every collector failed or was skipped.
    pub fn local_only(
        &self,
        url: &str,
        domain: &Domain,
        collectors: &[CollectorResult],
        heuristics: &HeuristicScore,
    ) -> SecurityReport {
        let mut breakdown: Vec<SourceEntry> = if collectors.is_empty() {
            CollectorKind::ALL
                .iter()
                .map(|kind| SourceEntry {
                    source: kind.as_str().to_string(),
                    status: SourceStatus::Skipped,
                    points: 0.0,
                })
                .collect()
        } else {
            collectors.iter().map(|c| source_entry(c, 0.0)).collect()
        };

        let heuristic_points = heuristics.overall_risk() * 100.0;
        breakdown.push(SourceEntry {
            source: HEURISTICS_SOURCE.to_string(),
            status: SourceStatus::Ok,
            points: heuristic_points,
        });

        let mut recommendations = Vec::new();
        self.heuristic_recommendations(heuristics, &mut recommendations);

        let risk_score = to_risk_score(heuristic_points);

        SecurityReport {
            scan_id: Uuid::new_v4(),
            scanned_at: Utc::now(),
            subject: url.to_string(),
            input_kind: InputKind::Url,
            domain: Some(domain.to_string()),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            domain_age: Some(UNKNOWN.to_string()),
            registrar: Some(ANALYSIS_UNAVAILABLE.to_string()),
            country: Some(UNKNOWN.to_string()),
            isp: Some(ANALYSIS_UNAVAILABLE.to_string()),
            ssl_status: Some(ANALYSIS_UNAVAILABLE.to_string()),
            threats_detected: collect_threats(collectors, heuristics),
            recommendations,
            source_breakdown: breakdown,
            degraded: true,
        }
    }

    /// Report for scanned content that is not a URL.
    pub fn text_report(&self, text: &str, analysis: &TextAnalysis) -> SecurityReport {
        let risk_score = analysis.score.min(100);

        let recommendation = if analysis.is_clean() {
            NO_OBVIOUS_THREATS
        } else if risk_score >= 60 {
            TEXT_DO_NOT_ENGAGE
        } else {
            TEXT_VERIFY_SENDER
        };

        SecurityReport {
            scan_id: Uuid::new_v4(),
            scanned_at: Utc::now(),
            subject: text.to_string(),
            input_kind: InputKind::Text,
            domain: None,
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            domain_age: None,
            registrar: None,
            country: None,
            isp: None,
            ssl_status: None,
            threats_detected: analysis.threats.clone(),
            recommendations: vec![recommendation.to_string()],
            source_breakdown: vec![SourceEntry {
                source: TEXT_SOURCE.to_string(),
                status: SourceStatus::Ok,
                points: f64::from(risk_score),
            }],
            degraded: false,
        }
    }

    fn heuristic_recommendations(&self, heuristics: &HeuristicScore, out: &mut Vec<String>) {
        if heuristics.phishing > self.phishing_threshold {
            out.push(PHISHING_WARNING.to_string());
        }
        if heuristics.malware > self.malware_threshold {
            out.push(MALWARE_WARNING.to_string());
        }
        if out.is_empty() {
            out.push(NO_OBVIOUS_THREATS.to_string());
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(AggregationWeights::default())
    }
}

fn source_entry(result: &CollectorResult, points: f64) -> SourceEntry {
    let status = match &result.error {
        _ if result.skipped => SourceStatus::Skipped,
        None => SourceStatus::Ok,
        Some(reason) => SourceStatus::Unavailable {
            reason: reason.clone(),
        },
    };
    SourceEntry {
        source: result.source.as_str().to_string(),
        status,
        points,
    }
}

/// Collector threats in collector order, then heuristic threats. No deduplication.
fn collect_threats(collectors: &[CollectorResult], heuristics: &HeuristicScore) -> Vec<String> {
    collectors
        .iter()
        .flat_map(|c| c.threats.iter().cloned())
        .chain(heuristics.threats.iter().cloned())
        .collect()
}

fn registration_fields(collectors: &[CollectorResult]) -> (String, String) {
    collectors
        .iter()
        .filter(|c| c.is_available())
        .find_map(|c| match &c.detail {
            CollectorDetail::Registration {
                domain_age_days,
                registrar,
            } => Some((
                domain_age_days
                    .map(|days| format!("{} days", days))
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                registrar.clone(),
            )),
            _ => None,
        })
        .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()))
}

fn geolocation_fields(collectors: &[CollectorResult]) -> (String, String) {
    collectors
        .iter()
        .filter(|c| c.is_available())
        .find_map(|c| match &c.detail {
            CollectorDetail::Geolocation { country, isp, .. } => {
                Some((country.clone(), isp.clone()))
            }
            _ => None,
        })
        .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_risk_score_rounds_and_clamps() {
        assert_eq!(to_risk_score(-3.0), 0);
        assert_eq!(to_risk_score(12.5), 13);
        assert_eq!(to_risk_score(12.49), 12);
        assert_eq!(to_risk_score(250.0), 100);
        assert_eq!(to_risk_score(f64::NAN), 0);
    }
}
