//! Health, readiness and version reporting.
//!
//! Lifecycle: `Starting -> Ready -> Serving -> Degraded`. Transitions only move
//! forward and `Degraded` is terminal. A run of consecutive inference faults
//! reaching the configured threshold marks the process degraded; a successful
//! prediction resets the run.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use tracing::{error, info, warn};

/// Default number of consecutive faults before the process is degraded.
pub const DEFAULT_FAULT_THRESHOLD: u32 = 5;

/// Deployment label distinguishing stable from canary instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionTag {
    fn default() -> Self {
        Self("unknown".to_string())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ServiceState {
    Starting = 0,
    Ready = 1,
    Serving = 2,
    Degraded = 3,
}

impl ServiceState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ServiceState::Starting,
            1 => ServiceState::Ready,
            2 => ServiceState::Serving,
            _ => ServiceState::Degraded,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Starting => "starting",
            ServiceState::Ready => "ready",
            ServiceState::Serving => "serving",
            ServiceState::Degraded => "degraded",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `GET /health` and `GET /ready`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub model: String,
    pub model_loaded: bool,
    pub version: VersionTag,
    pub state: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fault: Option<String>,
    pub fault_count: u32,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Shared health state. Reads and the hot-path updates are lock-free; only the
/// last fault message sits behind a lock.
#[derive(Debug)]
pub struct HealthReporter {
    version: VersionTag,
    state: AtomicU8,
    consecutive_faults: AtomicU32,
    fault_threshold: u32,
    last_fault: RwLock<Option<String>>,
}

impl HealthReporter {
    pub fn new(version: VersionTag, fault_threshold: u32) -> Self {
        Self {
            version,
            state: AtomicU8::new(ServiceState::Starting as u8),
            consecutive_faults: AtomicU32::new(0),
            fault_threshold: fault_threshold.max(1),
            last_fault: RwLock::new(None),
        }
    }

    pub fn version(&self) -> &VersionTag {
        &self.version
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: ServiceState, to: ServiceState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// The bundle is loaded; the process may accept traffic.
    pub fn mark_ready(&self) {
        if self.transition(ServiceState::Starting, ServiceState::Ready) {
            info!(version = %self.version, "Service ready");
        }
    }

    /// A request was handled. Moves `Ready` to `Serving` once.
    pub fn mark_serving(&self) {
        if self.transition(ServiceState::Ready, ServiceState::Serving) {
            info!(version = %self.version, "First request handled");
        }
    }

    /// A prediction completed successfully.
    pub fn record_success(&self) {
        self.consecutive_faults.store(0, Ordering::Release);
        self.mark_serving();
    }

    /// An inference fault occurred. Returns the resulting state.
    pub fn record_fault(&self, message: impl Into<String>) -> ServiceState {
        let message = message.into();
        let count = self.consecutive_faults.fetch_add(1, Ordering::AcqRel) + 1;
        *self.last_fault.write() = Some(message.clone());

        if count >= self.fault_threshold {
            let previous = self.state.swap(ServiceState::Degraded as u8, Ordering::AcqRel);
            if ServiceState::from_u8(previous) != ServiceState::Degraded {
                error!(
                    consecutive_faults = count,
                    threshold = self.fault_threshold,
                    last_fault = %message,
                    "Service degraded"
                );
            }
        } else {
            warn!(consecutive_faults = count, threshold = self.fault_threshold, "Inference fault");
        }
        self.state()
    }

    pub fn consecutive_faults(&self) -> u32 {
        self.consecutive_faults.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), ServiceState::Ready | ServiceState::Serving)
    }

    pub fn report(&self) -> HealthReport {
        let state = self.state();
        let model_loaded = state != ServiceState::Starting;
        let healthy = model_loaded && state != ServiceState::Degraded;
        HealthReport {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            model: if model_loaded { "SVM loaded" } else { "SVM not loaded" }.to_string(),
            model_loaded,
            version: self.version.clone(),
            state,
            last_fault: self.last_fault.read().clone(),
            fault_count: self.consecutive_faults(),
        }
    }
}
