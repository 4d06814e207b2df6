pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod report;
pub mod scan;
pub mod session;
pub mod text;

pub use aggregate::Aggregator;
pub use classify::{Domain, ScanInput, classify, extract_domain};
pub use config::ScanConfig;
pub use error::{CoreError, Result, SessionError};
pub use heuristics::{HeuristicEngine, HeuristicScore};
pub use report::{ReportFormat, RiskLevel, SecurityReport};
pub use scan::ScanPipeline;
pub use session::{ScanSession, ScanTicket};
pub use text::{TextAnalysis, TextAnalyzer};

use colored::Colorize;

const BANNER: &str = r#"
   ____                    ____  _     _      _     _
  / ___|  ___ __ _ _ __ __/ ___|| |__ (_) ___| | __| |
  \___ \ / __/ _` | '_ ` _ \___ \| '_ \| |/ _ \ |/ _` |
   ___) | (_| (_| | | | | | |__) | | | | |  __/ | (_| |
  |____/ \___\__,_|_| |_| |_|____/|_| |_|_|\___|_|\__,_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "QR and URL scam scanner".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
