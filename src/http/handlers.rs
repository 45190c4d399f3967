//! Route handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::Instrument;

use crate::config::Mode;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics::record_request_duration;
use crate::workload::{post_processing, run_cpu_work, simulate_db_call};

/// Route template, used as the `route` metric attribute.
pub const ITEMS_ROUTE: &str = "/items/{item_id}";
pub const PROCESS_ROUTE: &str = "/process/{task_id}";
pub const METRICS_ROUTE: &str = "/metrics";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item_id: i64,
    pub status: &'static str,
    pub mode: Mode,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub task_id: String,
    pub mode: Mode,
}

/// `GET /items/{item_id}`: database call, CPU work, post-processing.
pub async fn get_item(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ItemResponse>, ApiError> {
    let Path(item_id) = path?;
    let start = Instant::now();
    let profile = &state.profile;

    let span = tracing::info_span!("handler.get_item", item.id = item_id);
    async {
        simulate_db_call(profile.db_delay).await;
        run_cpu_work(profile.cpu_policy, profile.cpu_iterations).await?;
        post_processing(profile.post_processing).await;
        Ok::<_, ApiError>(())
    }
    .instrument(span)
    .await?;

    let duration_ms = record_request_duration(ITEMS_ROUTE, start);
    tracing::debug!(item_id, duration_ms, "Item served");

    Ok(Json(ItemResponse {
        item_id,
        status: "ok",
        mode: state.mode,
    }))
}

/// `POST /process/{task_id}`: queue a background job and answer at once.
pub async fn process(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<ProcessResponse> {
    state.jobs.submit(task_id.clone());
    tracing::debug!(task_id = %task_id, "Background job queued");

    Json(ProcessResponse {
        status: "queued",
        task_id,
        mode: state.mode,
    })
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
