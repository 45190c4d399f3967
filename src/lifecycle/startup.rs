//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the config file (if any) and apply command-line overrides
//! - Bind the listener and run the server until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Telemetry is initialized by the caller before `serve`, so startup
//!   itself is logged

use std::path::Path;

use tokio::net::TcpListener;

use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, Mode, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub mode: Option<Mode>,
    pub bind_address: Option<String>,
    pub disable_tracing: bool,
}

/// Load `path` (or defaults), layer `overrides` on top and validate the result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(mode) = overrides.mode {
        config.mode = mode;
    }
    if let Some(bind_address) = overrides.bind_address {
        config.listener.bind_address = bind_address;
    }
    if overrides.disable_tracing {
        config.observability.tracing_enabled = false;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Bind the configured address and serve until `shutdown` fires.
pub async fn serve(config: ServiceConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let profile = config.profile();
    tracing::info!(
        mode = %config.mode,
        bind_address = %config.listener.bind_address,
        db_delay_ms = profile.db_delay.as_millis() as u64,
        cpu_iterations = profile.cpu_iterations,
        cpu_policy = ?profile.cpu_policy,
        post_processing_ms = profile.post_processing.as_millis() as u64,
        background_job_ms = profile.background_job.as_millis() as u64,
        "Configuration loaded"
    );

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
