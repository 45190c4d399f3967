//! Fire-and-forget background jobs.
//!
//! # Responsibilities
//! - Accept jobs from handlers without blocking them
//! - Run each job off the request path on the blocking pool
//! - Trace and meter every job; log failures, never surface them
//!
//! # Design Decisions
//! - Unbounded queue: `submit` never waits and never fails the caller
//! - One blocking task per job, so a slow job does not delay the next
//! - The request span is captured at submit time and parents the job span

use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tracing::Span;

use crate::config::WorkloadProfile;
use crate::observability::metrics::record_job_duration;

/// A queued unit of background work.
#[derive(Debug)]
pub struct Job {
    pub task_id: String,
    parent: Span,
}

/// Handle used by request handlers to enqueue jobs.
#[derive(Clone, Debug)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl JobQueue {
    /// Enqueue a job for `task_id`.
    ///
    /// Returns `false` if the runner has stopped; the job is dropped.
    pub fn submit(&self, task_id: impl Into<String>) -> bool {
        let job = Job {
            task_id: task_id.into(),
            parent: Span::current(),
        };
        match self.tx.send(job) {
            Ok(()) => true,
            Err(mpsc::error::SendError(job)) => {
                tracing::warn!(task_id = %job.task_id, "Job runner stopped, dropping job");
                false
            }
        }
    }
}

/// Worker that drains the job queue.
pub struct JobRunner {
    rx: mpsc::UnboundedReceiver<Job>,
    duration: Duration,
    task_type: &'static str,
}

impl JobRunner {
    /// Create a runner for the profile's background job and its queue.
    pub fn new(profile: &WorkloadProfile) -> (JobQueue, Self) {
        Self::with_settings(profile.background_job, profile.job_type)
    }

    pub fn with_settings(duration: Duration, task_type: &'static str) -> (JobQueue, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            JobQueue { tx },
            Self {
                rx,
                duration,
                task_type,
            },
        )
    }

    /// Dispatch jobs until shutdown or until every queue handle is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            job_ms = self.duration.as_millis() as u64,
            task_type = self.task_type,
            "Job runner starting"
        );

        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(job) => self.dispatch(job),
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("Job runner received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn dispatch(&self, job: Job) {
        let duration = self.duration;
        let task_type = self.task_type;
        let task_id = job.task_id.clone();

        let handle = tokio::task::spawn_blocking(move || run_job(job, duration, task_type));
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                tracing::warn!(task_id = %task_id, error = %e, "Background job failed");
            }
        });
    }
}

/// Body of one job; runs on a blocking-pool thread.
fn run_job(job: Job, duration: Duration, task_type: &'static str) {
    let start = Instant::now();
    {
        let _span = tracing::info_span!(
            parent: &job.parent,
            "background.job",
            task.id = %job.task_id
        )
        .entered();
        std::thread::sleep(duration);
    }
    let duration_ms = record_job_duration(task_type, start);
    tracing::debug!(task_id = %job.task_id, duration_ms, "Background job finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics;
    use crate::observability::testing::SpanRecorder;

    fn job_count(rendered: &str, task_type: &str) -> Option<u64> {
        let needle = format!("background_job_duration_count{{task_type=\"{task_type}\"}}");
        rendered
            .lines()
            .find(|l| l.starts_with(&needle))
            .and_then(|l| l.rsplit(' ').next())
            .and_then(|v| v.parse().ok())
    }

    #[tokio::test]
    async fn test_jobs_run_and_are_metered() {
        let handle = metrics::install().unwrap();
        let (tx, _) = broadcast::channel(1);
        let (queue, runner) = JobRunner::with_settings(Duration::from_millis(5), "unit-runner");
        let worker = tokio::spawn(runner.run(tx.subscribe()));

        assert!(queue.submit("a"));
        assert!(queue.submit("b"));

        let mut seen = None;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            seen = job_count(&handle.render(), "unit-runner");
            if seen == Some(2) {
                break;
            }
        }
        assert_eq!(seen, Some(2));

        tx.send(()).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_dropped() {
        let (tx, _) = broadcast::channel(1);
        let (queue, runner) = JobRunner::with_settings(Duration::ZERO, "unit-stopped");
        let worker = tokio::spawn(runner.run(tx.subscribe()));

        tx.send(()).unwrap();
        worker.await.unwrap();

        assert!(!queue.submit("late"));
    }

    #[test]
    fn test_job_span_parents_under_submitter() {
        let (recorder, _guard) = SpanRecorder::install();

        let job = {
            let _request = tracing::info_span!("request").entered();
            Job {
                task_id: "t-9".into(),
                parent: Span::current(),
            }
        };
        // The submitting span is no longer entered when the job runs.
        run_job(job, Duration::ZERO, "unit-span");

        let span = recorder.single("background.job");
        assert_eq!(span.parent, Some("request"));
        assert_eq!(span.fields.get("task.id").map(String::as_str), Some("t-9"));
    }
}
