//! Latency demo service.
//!
//! ```text
//! Client ──▶ request ID ──▶ HTTP span ──▶ timeout ──▶ router
//!
//! GET /items/{id}      db.query → cpu work → post.processing → request_duration
//!                                   │
//!                                   ├─ bottlenecks: inline on the event loop
//!                                   └─ optimized:   spawn_blocking, awaited
//!
//! POST /process/{id}   JobQueue::submit → JobRunner → blocking pool
//!                                                     background.job → job_duration
//!
//! GET /metrics         Prometheus text
//! ```
//!
//! The runtime is deliberately single-threaded: it is the event loop whose
//! availability the two modes are meant to contrast.

use std::path::PathBuf;

use clap::Parser;

use latency_demo::config::Mode;
use latency_demo::lifecycle::{self, signals, Overrides, Shutdown};
use latency_demo::observability::{logging, tracing::init_tracer};

#[derive(Parser)]
#[command(name = "latency-demo")]
#[command(about = "HTTP service contrasting a bottlenecked and an optimized request path", long_about = None)]
struct Cli {
    /// Request-handling variant (overrides the config file).
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:8000 (overrides the config file).
    #[arg(short, long)]
    bind: Option<String>,

    /// Do not export spans.
    #[arg(long)]
    no_tracing: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = lifecycle::resolve_config(
        cli.config.as_deref(),
        Overrides {
            mode: cli.mode,
            bind_address: cli.bind,
            disable_tracing: cli.no_tracing,
        },
    )?;

    let (tracer, tracing_guard) = match init_tracer(&config)? {
        Some((tracer, guard)) => (Some(tracer), Some(guard)),
        None => (None, None),
    };
    logging::init(&config.observability, tracer)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.service_name(),
        "latency-demo starting"
    );
    if tracing_guard.is_some() {
        tracing::info!(
            endpoint = %config.observability.traces_endpoint(),
            "Exporting spans over OTLP/HTTP"
        );
    }

    let shutdown = Shutdown::new();
    signals::spawn_handler(shutdown.clone());

    lifecycle::serve(config, &shutdown).await?;

    drop(tracing_guard);
    tracing::info!("Shutdown complete");
    Ok(())
}
