//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP/HTTP span exporter and batch processor
//! - Attach the `service.name` resource
//! - Flush pending spans on shutdown
//!
//! # Design Decisions
//! - Spans are created with `tracing` and bridged by `tracing-opentelemetry`
//! - The batch processor runs on its own thread so the single-threaded
//!   request runtime never exports spans inline
//! - Export failures are reported by the SDK and never reach a request

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::runtime::TokioCurrentThread;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::ServiceConfig;
use crate::observability::TelemetryError;

/// Owns the tracer provider; flushes and shuts it down when dropped.
pub struct TracingGuard {
    provider: TracerProvider,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        for result in self.provider.force_flush() {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to flush spans");
            }
        }
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }
}

/// Build the OTLP tracer for this service.
///
/// Returns `None` when tracing is disabled in config.
pub fn init_tracer(config: &ServiceConfig) -> Result<Option<(Tracer, TracingGuard)>, TelemetryError> {
    if !config.observability.tracing_enabled {
        return Ok(None);
    }

    let endpoint = config.observability.traces_endpoint();
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, TokioCurrentThread)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name(),
        )]))
        .build();

    let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
    opentelemetry::global::set_tracer_provider(provider.clone());

    Ok(Some((tracer, TracingGuard { provider })))
}
