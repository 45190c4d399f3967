//! Simulated CPU-bound work and where it runs.

use std::hint::black_box;

use tracing::Instrument;

use crate::config::CpuPolicy;
use crate::workload::WorkloadError;

/// Sum `0..iterations` one step at a time.
///
/// `black_box` keeps the optimizer from folding the loop into a closed form,
/// so the cost stays proportional to `iterations`.
pub fn accumulate(iterations: u64) -> u64 {
    let mut total: u64 = 0;
    for i in 0..iterations {
        total = black_box(total.wrapping_add(i));
    }
    total
}

/// Run the accumulation loop according to `policy`.
///
/// `Inline` occupies the calling task until the loop finishes; on a
/// current-thread runtime nothing else is polled meanwhile. `Offload` hands
/// the loop to the blocking pool and yields until it completes.
pub async fn run_cpu_work(policy: CpuPolicy, iterations: u64) -> Result<u64, WorkloadError> {
    match policy {
        CpuPolicy::Inline => {
            let _span = tracing::info_span!("cpu.work.blocking", iterations).entered();
            Ok(accumulate(iterations))
        }
        CpuPolicy::Offload => {
            let span = tracing::info_span!("cpu.work.offloaded", iterations);
            offload(iterations).instrument(span).await
        }
    }
}

async fn offload(iterations: u64) -> Result<u64, WorkloadError> {
    // Created here so it parents under `cpu.work.offloaded`.
    let span = tracing::info_span!("cpu.work");
    let total = tokio::task::spawn_blocking(move || span.in_scope(|| accumulate(iterations))).await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_matches_closed_form() {
        for n in [0u64, 1, 2, 10, 12_345] {
            let expected = n.saturating_sub(1) * n / 2;
            assert_eq!(accumulate(n), expected, "n = {n}");
        }
    }

    #[tokio::test]
    async fn test_policies_agree_on_result() {
        let inline = run_cpu_work(CpuPolicy::Inline, 50_000).await.unwrap();
        let offloaded = run_cpu_work(CpuPolicy::Offload, 50_000).await.unwrap();
        assert_eq!(inline, offloaded);
        assert_eq!(inline, accumulate(50_000));
    }
}
