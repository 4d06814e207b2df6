// Scan pipeline: classify, fan out to collectors, join, aggregate

use crate::aggregate::Aggregator;
use crate::classify::{Domain, ScanInput, classify};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::heuristics::HeuristicEngine;
use crate::report::SecurityReport;
use crate::text::TextAnalyzer;
use scamshield_scanner::client::build_client;
use scamshield_scanner::collectors::{
    GeolocationCollector, PolicyMatchCollector, RegistrationCollector, ReputationCollector,
};
use scamshield_scanner::{
    Collector, CollectorResult, ScanError, ScanTarget, SslProbe, SslStatus, run_collector,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const NO_HOST: &str = "URL has no host";

pub struct ScanPipeline {
    collectors: Vec<Arc<dyn Collector>>,
    probe: Option<SslProbe>,
    heuristics: HeuristicEngine,
    text: TextAnalyzer,
    aggregator: Aggregator,
    timeout: Duration,
    offline: bool,
}

impl ScanPipeline {
    /// Local analysis only. Add sources with [`ScanPipeline::with_collector`].
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            collectors: Vec::new(),
            probe: None,
            heuristics: HeuristicEngine::new(config.heuristics.clone())?,
            text: TextAnalyzer::new(&config.heuristics.text)?,
            aggregator: Aggregator::with_thresholds(config.weights.clone(), &config.heuristics),
            timeout: config.collector_timeout(),
            offline: config.offline,
        })
    }

    /// Wires up the four API collectors and the HTTPS probe from `config`.
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let mut pipeline = Self::new(config)?;
        if config.offline {
            info!("Offline mode: collectors and probe disabled");
            return Ok(pipeline);
        }

        let client = build_client(config.collector_timeout().as_secs())?;
        let credentials = &config.credentials;
        let endpoints = &config.endpoints;

        pipeline = pipeline
            .with_collector(Arc::new(
                ReputationCollector::new(client.clone(), credentials.reputation.clone())
                    .with_base_url(&endpoints.reputation),
            ))
            .with_collector(Arc::new(
                RegistrationCollector::new(client.clone(), credentials.registration.clone())
                    .with_base_url(&endpoints.registration),
            ))
            .with_collector(Arc::new(
                GeolocationCollector::new(client.clone(), credentials.geolocation.clone())
                    .with_base_url(&endpoints.geolocation),
            ))
            .with_collector(Arc::new(
                PolicyMatchCollector::new(client.clone(), credentials.policy_match.clone())
                    .with_base_url(&endpoints.policy_match),
            ));

        if config.probe_ssl {
            pipeline = pipeline.with_probe(SslProbe::new(client));
        }

        Ok(pipeline)
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn with_probe(mut self, probe: SslProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Scans one piece of content. Always produces a report.
    pub async fn scan(&self, raw: &str) -> SecurityReport {
        match classify(raw) {
            ScanInput::Text(text) => {
                debug!("Input is not a URL; running text analysis");
                let analysis = self.text.analyze(&text);
                self.aggregator.text_report(&text, &analysis)
            }
            ScanInput::Url { url, domain } => self.scan_url(&url, &domain).await,
        }
    }

    async fn scan_url(&self, url: &str, domain: &Domain) -> SecurityReport {
        info!("Scanning {} ({})", url, domain);
        let heuristics = self.heuristics.evaluate(url, domain.as_str());

        if self.offline || self.collectors.is_empty() {
            return self.aggregator.local_only(url, domain, &[], &heuristics);
        }

        let target = ScanTarget::new(url, domain.to_ascii());
        let (results, ssl) = tokio::join!(
            self.run_collectors(&target, domain.is_valid()),
            self.probe_ssl(&target, domain.is_valid())
        );

        let report = self
            .aggregator
            .aggregate(url, domain, &results, &heuristics, ssl);
        info!(
            "Scan of {} complete: risk {}/100, {} threats",
            url,
            report.risk_score,
            report.threats_detected.len()
        );
        report
    }

    /// One task per collector; waits for all of them. Results keep collector order.
    /// Without a usable host the domain-keyed sources are skipped.
    async fn run_collectors(&self, target: &ScanTarget, has_host: bool) -> Vec<CollectorResult> {
        let mut handles = Vec::with_capacity(self.collectors.len());

        for collector in &self.collectors {
            let kind = collector.kind();
            if !has_host && kind.is_domain_keyed() {
                debug!("Skipping {} collector: no host in {}", kind, target.url);
                handles.push((kind, None));
                continue;
            }

            let collector = Arc::clone(collector);
            let target = target.clone();
            let timeout = self.timeout;

            let handle = tokio::spawn(async move {
                run_collector(collector.as_ref(), &target, timeout).await
            });
            handles.push((kind, Some(handle)));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (kind, handle) in handles {
            let Some(handle) = handle else {
                results.push(CollectorResult::skipped(kind, NO_HOST));
                continue;
            };
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Collector {} task failed: {}", kind, e);
                    results.push(CollectorResult::with_error(
                        kind,
                        ScanError::from(e).to_string(),
                    ));
                }
            }
        }
        results
    }

    async fn probe_ssl(&self, target: &ScanTarget, has_host: bool) -> SslStatus {
        let Some(probe) = self.probe.as_ref().filter(|_| has_host) else {
            return SslStatus::Unknown;
        };
        tokio::time::timeout(self.timeout, probe.probe(&target.domain))
            .await
            .unwrap_or(SslStatus::Unknown)
    }
}
