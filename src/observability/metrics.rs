//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Install the Prometheus recorder behind the `metrics` facade
//! - Declare the service's duration histograms
//! - Render the exposition text for `GET /metrics`
//!
//! # Metrics
//! - `http.server.request_duration` (histogram, ms): handler-measured latency by `route`
//! - `background.job.duration` (histogram, ms): background job latency by `task.type`
//!
//! The exporter sanitizes names and label keys, so these appear as
//! `http_server_request_duration` and `background_job_duration` with labels
//! `route` and `task_type` in the scrape output.

use std::sync::Mutex;
use std::time::Instant;

use metrics::{describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const REQUEST_DURATION: &str = "http.server.request_duration";
pub const JOB_DURATION: &str = "background.job.duration";

/// Bucket bounds in milliseconds, covering both the fast and slow profiles.
const DURATION_BUCKETS_MS: &[f64] = &[
    5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0, 7500.0,
    10000.0,
];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the global Prometheus recorder.
///
/// The recorder is process-wide; repeated calls return a handle to the one
/// already installed, so several servers in one process share a registry.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let mut slot = HANDLE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    // Suffix match works for both the dotted and the sanitized name.
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Suffix("duration".to_string()), DURATION_BUCKETS_MS)?
        .install_recorder()?;

    describe_histogram!(
        REQUEST_DURATION,
        Unit::Milliseconds,
        "End-to-end request duration measured in handler"
    );
    describe_histogram!(JOB_DURATION, Unit::Milliseconds, "Background job duration");

    tracing::debug!("Prometheus recorder installed");
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Milliseconds elapsed since `start`, never negative.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Record one completed request.
pub fn record_request_duration(route: &'static str, start: Instant) -> f64 {
    let ms = elapsed_ms(start);
    histogram!(REQUEST_DURATION, "route" => route).record(ms);
    ms
}

/// Record one finished background job.
pub fn record_job_duration(task_type: &'static str, start: Instant) -> f64 {
    let ms = elapsed_ms(start);
    histogram!(JOB_DURATION, "task.type" => task_type).record(ms);
    ms
}
