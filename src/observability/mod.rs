//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, workload simulators and background jobs produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → tracing.rs (spans exported over OTLP/HTTP)
//!     → metrics.rs (duration histograms)
//!
//! Consumers:
//!     → stdout
//!     → GET /metrics (Prometheus scrape)
//!     → Trace collector (e.g., Jaeger at :4318)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;

#[cfg(test)]
pub(crate) mod testing;

pub use self::tracing::TracingGuard;

/// Error type for telemetry setup.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP span exporter: {0}")]
    Exporter(#[from] opentelemetry::trace::TraceError),

    #[error("failed to install Prometheus recorder: {0}")]
    Recorder(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
