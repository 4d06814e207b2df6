// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    apply_overrides, init_tracing, load_inputs_from_file, load_inputs_from_source,
    parse_input_line, resolve_config, take_over_session, write_default_config,
};

// Re-export the scan surface from scamshield-core
pub use scamshield_core::{
    ReportFormat, RiskLevel, ScanConfig, ScanPipeline, ScanSession, ScanTicket, SecurityReport,
    SessionError,
};
