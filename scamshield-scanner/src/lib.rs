pub mod client;
pub mod collector;
pub mod collectors;
pub mod error;
pub mod probe;
pub mod result;

pub use collector::{Collector, ScanTarget, run_collector};
pub use error::ScanError;
pub use probe::{SslProbe, SslStatus};
pub use result::{CollectorDetail, CollectorKind, CollectorResult};
