//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Own the background job runner for the server's lifetime
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{Mode, ServiceConfig, WorkloadProfile};
use crate::http::handlers::{self, ITEMS_ROUTE, METRICS_ROUTE, PROCESS_ROUTE};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::observability::{metrics, TelemetryError};
use crate::workload::{JobQueue, JobRunner};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mode: Mode,
    pub profile: Arc<WorkloadProfile>,
    pub jobs: JobQueue,
    pub metrics: PrometheusHandle,
}

/// HTTP server for one demo variant.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    job_runner: JobRunner,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, TelemetryError> {
        let profile = config.profile();
        let metrics = metrics::install()?;
        let (jobs, job_runner) = JobRunner::new(&profile);

        let state = AppState {
            mode: config.mode,
            profile: Arc::new(profile),
            jobs,
            metrics,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            job_runner,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route(ITEMS_ROUTE, get(handlers::get_item))
            .route(PROCESS_ROUTE, post(handlers::process))
            .route(METRICS_ROUTE, get(handlers::metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// A clone of the configured router, without the job runner attached.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.config.mode,
            "HTTP server starting"
        );

        let runner = tokio::spawn(self.job_runner.run(shutdown.resubscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Err(e) = runner.await {
            tracing::warn!(error = %e, "Job runner task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
