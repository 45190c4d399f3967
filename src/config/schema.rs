//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default collector endpoint for OTLP/HTTP trace export.
pub const DEFAULT_OTLP_TRACES_ENDPOINT: &str = "http://jaeger:4318/v1/traces";

/// Environment variable overriding the trace collector endpoint.
pub const OTLP_TRACES_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";

/// Which request-handling path the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Slow dependencies, CPU work on the event loop.
    Bottlenecks,
    /// Faster dependencies, CPU work offloaded to a worker thread.
    #[default]
    Optimized,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Bottlenecks => "bottlenecks",
            Mode::Optimized => "optimized",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Request-handling variant.
    pub mode: Mode,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Overrides for the mode's workload profile.
    pub workload: WorkloadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Default configuration for the given mode.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Resolve the effective workload: mode profile plus config overrides.
    pub fn profile(&self) -> WorkloadProfile {
        self.workload.apply(WorkloadProfile::for_mode(self.mode))
    }

    /// Service name reported in the trace resource.
    pub fn service_name(&self) -> String {
        self.observability
            .service_name
            .clone()
            .unwrap_or_else(|| format!("latency-demo-{}", self.mode))
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Optional overrides of the workload profile. Unset fields keep the
/// mode's default.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WorkloadConfig {
    pub db_delay_ms: Option<u64>,
    pub cpu_iterations: Option<u64>,
    pub post_processing_ms: Option<u64>,
    pub background_job_ms: Option<u64>,
}

impl WorkloadConfig {
    fn apply(&self, mut profile: WorkloadProfile) -> WorkloadProfile {
        if let Some(ms) = self.db_delay_ms {
            profile.db_delay = Duration::from_millis(ms);
        }
        if let Some(n) = self.cpu_iterations {
            profile.cpu_iterations = n;
        }
        if let Some(ms) = self.post_processing_ms {
            profile.post_processing = Duration::from_millis(ms);
        }
        if let Some(ms) = self.background_job_ms {
            profile.background_job = Duration::from_millis(ms);
        }
        profile
    }
}

/// Where the CPU accumulation loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuPolicy {
    /// On the task serving the request.
    Inline,
    /// On the blocking pool, awaited asynchronously.
    Offload,
}

/// Effective simulated latencies for one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadProfile {
    pub db_delay: Duration,
    pub cpu_iterations: u64,
    pub cpu_policy: CpuPolicy,
    pub post_processing: Duration,
    pub background_job: Duration,
    /// Value of the `task.type` attribute on background job metrics.
    pub job_type: &'static str,
}

impl WorkloadProfile {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Bottlenecks => Self {
                db_delay: Duration::from_millis(400),
                cpu_iterations: 7_000_000,
                cpu_policy: CpuPolicy::Inline,
                post_processing: Duration::from_millis(100),
                background_job: Duration::from_millis(1200),
                job_type: "slow",
            },
            Mode::Optimized => Self {
                db_delay: Duration::from_millis(80),
                cpu_iterations: 7_000_000,
                cpu_policy: CpuPolicy::Offload,
                post_processing: Duration::from_millis(20),
                background_job: Duration::from_millis(200),
                job_type: "fast",
            },
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Export spans to an OTLP collector.
    pub tracing_enabled: bool,

    /// OTLP/HTTP traces endpoint. The environment variable wins over this.
    pub otlp_traces_endpoint: String,

    /// Trace resource `service.name`; derived from the mode when unset.
    pub service_name: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tracing_enabled: true,
            otlp_traces_endpoint: DEFAULT_OTLP_TRACES_ENDPOINT.to_string(),
            service_name: None,
        }
    }
}

impl ObservabilityConfig {
    /// Effective traces endpoint, honouring the standard OTel variable.
    pub fn traces_endpoint(&self) -> String {
        match std::env::var(OTLP_TRACES_ENDPOINT_ENV) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => self.otlp_traces_endpoint.clone(),
        }
    }
}
