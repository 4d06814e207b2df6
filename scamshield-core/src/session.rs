// Single-flight scan session

use crate::error::SessionError;
use crate::report::SecurityReport;
use crate::scan::ScanPipeline;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct GateState {
    busy: bool,
    generation: u64,
}

type SharedGate = Arc<Mutex<GateState>>;

fn lock(gate: &Mutex<GateState>) -> MutexGuard<'_, GateState> {
    // The state is two plain values, so a poisoned lock is still consistent
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Allows one scan at a time. A reset releases the gate immediately; the
/// interrupted scan keeps running but its report is dropped.
pub struct ScanSession {
    pipeline: Arc<ScanPipeline>,
    gate: SharedGate,
}

/// Permission to run one scan, taken synchronously with [`ScanSession::begin`].
///
/// Dropping the ticket reopens the session unless a reset already handed the
/// gate to a newer scan.
pub struct ScanTicket {
    pipeline: Arc<ScanPipeline>,
    gate: SharedGate,
    generation: u64,
}

impl ScanSession {
    pub fn new(pipeline: ScanPipeline) -> Self {
        Self::from_shared(Arc::new(pipeline))
    }

    pub fn from_shared(pipeline: Arc<ScanPipeline>) -> Self {
        Self {
            pipeline,
            gate: Arc::new(Mutex::new(GateState::default())),
        }
    }

    pub fn pipeline(&self) -> &ScanPipeline {
        &self.pipeline
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.gate).busy
    }

    /// Takes the gate and records the current generation in one step.
    pub fn begin(&self) -> Result<ScanTicket, SessionError> {
        let mut state = lock(&self.gate);
        if state.busy {
            return Err(SessionError::Busy);
        }
        state.busy = true;

        Ok(ScanTicket {
            pipeline: Arc::clone(&self.pipeline),
            gate: Arc::clone(&self.gate),
            generation: state.generation,
        })
    }

    pub async fn scan(&self, raw: &str) -> Result<SecurityReport, SessionError> {
        self.begin()?.run(raw).await
    }

    /// Abandons the in-flight scan, if any, and reopens the session.
    pub fn reset(&self) {
        let mut state = lock(&self.gate);
        state.generation += 1;
        state.busy = false;
    }
}

impl ScanTicket {
    /// False once the session has been reset after this ticket was taken.
    pub fn is_current(&self) -> bool {
        lock(&self.gate).generation == self.generation
    }

    pub async fn run(self, raw: &str) -> Result<SecurityReport, SessionError> {
        if !self.is_current() {
            debug!("Scan of {} abandoned before it started", raw);
            return Err(SessionError::Discarded);
        }

        let report = self.pipeline.scan(raw).await;

        if !self.is_current() {
            debug!("Dropping report {} from a discarded scan", report.scan_id);
            return Err(SessionError::Discarded);
        }
        Ok(report)
    }
}

impl Drop for ScanTicket {
    fn drop(&mut self) {
        let mut state = lock(&self.gate);
        if state.generation == self.generation {
            state.busy = false;
        }
    }
}
