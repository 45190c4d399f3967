//! Simulated I/O-bound dependencies.

use std::time::Duration;

/// Stand-in for a database round trip.
#[tracing::instrument(name = "db.query", skip_all)]
pub async fn simulate_db_call(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// Async tail work after the CPU phase, e.g. serialization or a cache write.
#[tracing::instrument(name = "post.processing", skip_all)]
pub async fn post_processing(delay: Duration) {
    tokio::time::sleep(delay).await;
}
