// Security report model and renderers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

pub const UNKNOWN: &str = "Unknown";
pub const ANALYSIS_UNAVAILABLE: &str = "Analysis unavailable";
pub const NOT_APPLICABLE: &str = "Not applicable";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => RiskLevel::Safe,
            20..=39 => RiskLevel::Low,
            40..=59 => RiskLevel::Medium,
            60..=79 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Url,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Unavailable { reason: String },
    Skipped,
}

/// One signal source and the points it added to the risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source: String,
    pub status: SourceStatus,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub scan_id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub subject: String,
    pub input_kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_status: Option<String>,
    pub threats_detected: Vec<String>,
    pub recommendations: Vec<String>,
    pub source_breakdown: Vec<SourceEntry>,
    /// True when no collector answered and the score is heuristic-only.
    pub degraded: bool,
}

impl SecurityReport {
    fn field<'a>(&self, value: &'a Option<String>) -> &'a str {
        value.as_deref().unwrap_or(NOT_APPLICABLE)
    }
}

pub fn render(report: &SecurityReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
        ReportFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

pub fn generate_text_report(report: &SecurityReport) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                        SCAMSHIELD SECURITY REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!("Scan ID:      {}\n", report.scan_id));
    out.push_str(&format!(
        "Scan Date:    {}\n",
        report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Subject:      {}\n", report.subject));
    if let Some(ref domain) = report.domain {
        out.push_str(&format!("Domain:       {}\n", domain));
    }
    out.push_str(&format!(
        "Risk Score:   {}/100 ({})\n",
        report.risk_score,
        report.risk_level.as_str().to_uppercase()
    ));
    out.push('\n');

    if report.input_kind == InputKind::Url {
        out.push_str(&format!("Domain Age:   {}\n", report.field(&report.domain_age)));
        out.push_str(&format!("Registrar:    {}\n", report.field(&report.registrar)));
        out.push_str(&format!("Country:      {}\n", report.field(&report.country)));
        out.push_str(&format!("ISP:          {}\n", report.field(&report.isp)));
        out.push_str(&format!("SSL:          {}\n", report.field(&report.ssl_status)));
        out.push('\n');
    }

    out.push_str(RULE);
    out.push_str("\nTHREATS DETECTED\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    if report.threats_detected.is_empty() {
        out.push_str("  None\n");
    }
    for threat in &report.threats_detected {
        out.push_str(&format!("  [!] {}\n", threat));
    }
    out.push('\n');

    out.push_str(RULE);
    out.push_str("\nRECOMMENDATIONS\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    for recommendation in &report.recommendations {
        out.push_str(&format!("  -> {}\n", recommendation));
    }
    out.push('\n');

    if !report.source_breakdown.is_empty() {
        out.push_str(RULE);
        out.push_str("\nSOURCES\n");
        out.push_str(RULE);
        out.push_str("\n\n");
        for entry in &report.source_breakdown {
            out.push_str(&format!(
                "  {:<14} {:<24} +{:.1}\n",
                entry.source,
                format_status(&entry.status),
                entry.points
            ));
        }
        out.push('\n');
    }

    out.push_str("Generated by ScamShield. Scores are heuristic; stay cautious.\n");
    out
}

pub fn generate_json_report(report: &SecurityReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "metadata": {
            "generator": "ScamShield",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": Utc::now().to_rfc3339(),
            "format": "json"
        },
        "report": report
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(report: &SecurityReport) -> String {
    let mut md = String::new();

    md.push_str("# ScamShield Security Report\n\n");
    md.push_str("| Field | Value |\n|-------|-------|\n");
    md.push_str(&format!("| Subject | `{}` |\n", escape_markdown(&report.subject)));
    if let Some(ref domain) = report.domain {
        md.push_str(&format!("| Domain | {} |\n", domain));
    }
    md.push_str(&format!(
        "| Risk Score | **{}/100** ({}) |\n",
        report.risk_score,
        report.risk_level.as_str()
    ));
    if report.input_kind == InputKind::Url {
        md.push_str(&format!("| Domain Age | {} |\n", report.field(&report.domain_age)));
        md.push_str(&format!("| Registrar | {} |\n", report.field(&report.registrar)));
        md.push_str(&format!("| Country | {} |\n", report.field(&report.country)));
        md.push_str(&format!("| ISP | {} |\n", report.field(&report.isp)));
        md.push_str(&format!("| SSL | {} |\n", report.field(&report.ssl_status)));
    }
    md.push_str(&format!(
        "| Scanned | {} |\n\n",
        report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Threats Detected\n\n");
    if report.threats_detected.is_empty() {
        md.push_str("_None_\n");
    }
    for threat in &report.threats_detected {
        md.push_str(&format!("- {}\n", threat));
    }

    md.push_str("\n## Recommendations\n\n");
    for recommendation in &report.recommendations {
        md.push_str(&format!("- {}\n", recommendation));
    }

    if !report.source_breakdown.is_empty() {
        md.push_str("\n## Sources\n\n| Source | Status | Points |\n|--------|--------|--------|\n");
        for entry in &report.source_breakdown {
            md.push_str(&format!(
                "| {} | {} | {:.1} |\n",
                entry.source,
                format_status(&entry.status),
                entry.points
            ));
        }
    }

    md
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn format_status(status: &SourceStatus) -> String {
    match status {
        SourceStatus::Ok => "ok".to_string(),
        SourceStatus::Unavailable { .. } => "unavailable".to_string(),
        SourceStatus::Skipped => "skipped".to_string(),
    }
}

fn escape_markdown(text: &str) -> String {
    text.replace('`', "'").replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(79), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status(&SourceStatus::Unavailable {
                reason: "timeout".to_string()
            }),
            "unavailable"
        );
        assert_eq!(format_status(&SourceStatus::Skipped), "skipped");
    }
}
