//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use latency_demo::config::{Mode, ServiceConfig};
use latency_demo::workload::accumulate;
use latency_demo::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A service running on its own single-threaded runtime, like the binary.
pub struct TestService {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Boot `config` on a dedicated thread with a current-thread runtime.
pub fn spawn_service(config: ServiceConfig) -> TestService {
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (addr_tx, addr_rx) = mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            addr_tx.send(listener.local_addr().unwrap()).unwrap();
            let server = HttpServer::new(config).unwrap();
            server.run(listener, server_shutdown).await.unwrap();
        });
    });

    let addr = addr_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("service did not start");
    TestService { addr, shutdown }
}

/// A config with every simulated delay switched off.
#[allow(dead_code)]
pub fn instant_config(mode: Mode) -> ServiceConfig {
    let mut config = ServiceConfig::for_mode(mode);
    config.observability.tracing_enabled = false;
    config.workload.db_delay_ms = Some(0);
    config.workload.post_processing_ms = Some(0);
    config.workload.cpu_iterations = Some(1_000);
    config.workload.background_job_ms = Some(10);
    config
}

/// Iteration count that keeps `accumulate` busy for roughly `target`.
#[allow(dead_code)]
pub fn iterations_for(target: Duration) -> u64 {
    const SAMPLE: u64 = 2_000_000;
    let start = Instant::now();
    accumulate(SAMPLE);
    let per_iter = start.elapsed().as_secs_f64() / SAMPLE as f64;
    (target.as_secs_f64() / per_iter.max(1e-12)) as u64
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
