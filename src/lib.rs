//! Latency demo services.
//!
//! One HTTP service, two request-handling paths:
//!
//! - `bottlenecks`: slow simulated dependencies and a CPU loop that runs on
//!   the event loop, stalling every other request while it spins
//! - `optimized`: faster dependencies and the same loop moved to a worker
//!   thread, keeping the event loop free
//!
//! Both emit the same spans (exported over OTLP) and the same duration
//! histograms (scraped from `GET /metrics`), so the difference shows up in
//! Jaeger and Prometheus side by side.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod workload;

pub use config::{Mode, ServiceConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
