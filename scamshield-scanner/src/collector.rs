use crate::error::{Result, ScanError};
use crate::result::{CollectorKind, CollectorResult};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What a collector is asked about: the full URL and its extracted domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    pub url: String,
    pub domain: String,
}

impl ScanTarget {
    pub fn new(url: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            domain: domain.into(),
        }
    }
}

/// A single external signal source.
///
/// `query` may fail; callers go through [`run_collector`], which turns every
/// failure into the source's safe default so the pipeline always completes.
pub trait Collector: Send + Sync {
    fn kind(&self) -> CollectorKind;

    fn query<'a>(&'a self, target: &'a ScanTarget) -> BoxFuture<'a, Result<CollectorResult>>;
}

/// Runs one collector under a deadline. Never fails.
pub async fn run_collector(
    collector: &dyn Collector,
    target: &ScanTarget,
    timeout: Duration,
) -> CollectorResult {
    let kind = collector.kind();
    debug!("Collector {} querying {}", kind, target.url);

    let start = Instant::now();
    let outcome = match tokio::time::timeout(timeout, collector.query(target)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ScanError::Timeout(timeout.as_secs())),
    };

    match outcome {
        Ok(mut result) => {
            result.response_time = start.elapsed();
            debug!(
                "Collector {} finished in {:?} ({} threats)",
                kind,
                result.response_time,
                result.threats.len()
            );
            result
        }
        Err(e) => {
            warn!("Collector {} degraded to safe default: {}", kind, e);
            let mut result = CollectorResult::with_error(kind, e.to_string());
            result.response_time = start.elapsed();
            result
        }
    }
}
