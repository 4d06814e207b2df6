// Tests for report rendering and persistence

use chrono::Utc;
use scamshield_core::report::{
    InputKind, ReportFormat, RiskLevel, SecurityReport, SourceEntry, SourceStatus,
    generate_json_report, generate_markdown_report, generate_text_report, render, save_report,
};
use scamshield_core::{Aggregator, TextAnalyzer, config::TextAnalysisConfig};
use tempfile::TempDir;
use uuid::Uuid;

fn url_report() -> SecurityReport {
    SecurityReport {
        scan_id: Uuid::new_v4(),
        scanned_at: Utc::now(),
        subject: "http://paypal-verify.tk/login".to_string(),
        input_kind: InputKind::Url,
        domain: Some("paypal-verify.tk".to_string()),
        risk_score: 67,
        risk_level: RiskLevel::High,
        domain_age: Some("3 days".to_string()),
        registrar: Some("Freenom".to_string()),
        country: Some("Netherlands".to_string()),
        isp: Some("Unknown".to_string()),
        ssl_status: Some("Invalid".to_string()),
        threats_detected: vec!["Flagged as malicious by 12/70 security engines".to_string()],
        recommendations: vec!["Do not open it.".to_string()],
        source_breakdown: vec![
            SourceEntry {
                source: "reputation".to_string(),
                status: SourceStatus::Ok,
                points: 6.9,
            },
            SourceEntry {
                source: "geolocation".to_string(),
                status: SourceStatus::Unavailable {
                    reason: "Timed out after 10 seconds".to_string(),
                },
                points: 0.0,
            },
        ],
        degraded: false,
    }
}

fn text_report() -> SecurityReport {
    let analyzer = TextAnalyzer::new(&TextAnalysisConfig::default()).unwrap();
    let analysis = analyzer.analyze("Congratulations, you won the lottery!");
    Aggregator::default().text_report("Congratulations, you won the lottery!", &analysis)
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("csv").is_none());
    assert!(ReportFormat::from_str("pdf").is_none());
}

// ============================================================================
// Text Rendering Tests
// ============================================================================

#[test]
fn test_text_report_sections() {
    let out = generate_text_report(&url_report());

    assert!(out.contains("SCAMSHIELD SECURITY REPORT"));
    assert!(out.contains("Risk Score:   67/100 (HIGH)"));
    assert!(out.contains("Domain Age:   3 days"));
    assert!(out.contains("SSL:          Invalid"));
    assert!(out.contains("[!] Flagged as malicious by 12/70 security engines"));
    assert!(out.contains("-> Do not open it."));
    assert!(out.contains("unavailable"));
}

#[test]
fn test_text_report_for_text_input_hides_metadata() {
    let out = generate_text_report(&text_report());

    assert!(out.contains("Risk Score:   40/100 (MEDIUM)"));
    assert!(!out.contains("Domain Age:"));
    assert!(!out.contains("Registrar:"));
}

#[test]
fn test_text_report_without_threats() {
    let mut report = url_report();
    report.threats_detected.clear();
    let out = generate_text_report(&report);
    assert!(out.contains("  None\n"));
}

// ============================================================================
// JSON / Markdown Rendering Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&url_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["metadata"]["generator"], "ScamShield");
    assert_eq!(value["metadata"]["format"], "json");
    assert_eq!(value["report"]["risk_score"], 67);
    assert_eq!(value["report"]["risk_level"], "high");
    assert_eq!(value["report"]["input_kind"], "url");
    assert_eq!(
        value["report"]["source_breakdown"][1]["status"]["state"],
        "unavailable"
    );
}

#[test]
fn test_json_report_omits_metadata_for_text() {
    let json = generate_json_report(&text_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["input_kind"], "text");
    assert!(value["report"].get("domain").is_none());
    assert!(value["report"].get("ssl_status").is_none());
}

#[test]
fn test_json_report_roundtrips_into_report() {
    let original = url_report();
    let json = generate_json_report(&original).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let parsed: SecurityReport = serde_json::from_value(value["report"].clone()).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_markdown_report() {
    let md = generate_markdown_report(&url_report());

    assert!(md.starts_with("# ScamShield Security Report"));
    assert!(md.contains("| Risk Score | **67/100** (high) |"));
    assert!(md.contains("## Threats Detected"));
    assert!(md.contains("| geolocation | unavailable | 0.0 |"));
}

#[test]
fn test_markdown_escapes_subject() {
    let mut report = text_report();
    report.subject = "a | b `c`".to_string();
    let md = generate_markdown_report(&report);
    assert!(md.contains("| Subject | `a \\| b 'c'` |"));
}

#[test]
fn test_render_dispatches_on_format() {
    let report = url_report();
    assert_eq!(
        render(&report, ReportFormat::Text).unwrap(),
        generate_text_report(&report)
    );
    assert_eq!(
        render(&report, ReportFormat::Markdown).unwrap(),
        generate_markdown_report(&report)
    );
    assert!(render(&report, ReportFormat::Json).unwrap().contains("\"metadata\""));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_save_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.md");
    let content = generate_markdown_report(&url_report());

    save_report(&content, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_save_report_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.txt");
    assert!(save_report("x", &path).is_err());
}
