//! Simulated workload subsystem.
//!
//! # Data Flow
//! ```text
//! GET /items/{id}
//!     → io.rs   simulate_db_call   (async sleep, span db.query)
//!     → cpu.rs  run_cpu_work       (inline or offloaded accumulation loop)
//!     → io.rs   post_processing    (async sleep, span post.processing)
//!
//! POST /process/{id}
//!     → jobs.rs JobQueue::submit   (returns immediately)
//!     → jobs.rs JobRunner          (blocking pool, span background.job)
//! ```

pub mod cpu;
pub mod io;
pub mod jobs;

pub use cpu::{accumulate, run_cpu_work};
pub use io::{post_processing, simulate_db_call};
pub use jobs::{JobQueue, JobRunner};

/// Error type for simulated work.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error("CPU worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
