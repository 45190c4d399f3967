use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use futures_util::stream::{self, StreamExt};

#[derive(Parser)]
#[command(name = "loadgen")]
#[command(about = "Drive concurrent traffic at a latency-demo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire GET /items/{id} requests and report latency percentiles
    Items {
        /// Total number of requests
        #[arg(short = 'n', long, default_value_t = 50)]
        requests: usize,
        /// Requests in flight at once
        #[arg(short, long, default_value_t = 10)]
        concurrency: usize,
    },
    /// Queue background jobs via POST /process/{id}
    Process {
        #[arg(short = 'n', long, default_value_t = 20)]
        requests: usize,
    },
    /// Print histogram lines from GET /metrics
    Metrics,
}

struct Report {
    latencies: Vec<Duration>,
    failures: usize,
    elapsed: Duration,
}

impl Report {
    fn percentile(&self, p: f64) -> Duration {
        let idx = ((self.latencies.len() as f64 * p) as usize).min(self.latencies.len() - 1);
        self.latencies[idx]
    }

    fn print(&self, title: &str) {
        println!("\n--- {title} ---");
        println!("Successful:     {}", self.latencies.len());
        println!("Failed:         {}", self.failures);
        println!("Total Duration: {:?}", self.elapsed);
        if self.latencies.is_empty() {
            println!("-------------------------\n");
            return;
        }
        let rps = self.latencies.len() as f64 / self.elapsed.as_secs_f64();
        println!("Requests/sec:   {rps:.2}");
        println!("P50 Latency:    {:?}", self.percentile(0.50));
        println!("P95 Latency:    {:?}", self.percentile(0.95));
        println!("P99 Latency:    {:?}", self.percentile(0.99));
        println!("-------------------------\n");
    }
}

async fn drive<F>(requests: usize, concurrency: usize, send: F) -> Report
where
    F: Fn(usize) -> reqwest::RequestBuilder,
{
    let start = Instant::now();
    let results: Vec<Result<Duration, reqwest::Error>> = stream::iter(0..requests)
        .map(|i| {
            let request = send(i);
            async move {
                let req_start = Instant::now();
                request.send().await?.error_for_status()?;
                Ok::<_, reqwest::Error>(req_start.elapsed())
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut latencies = Vec::with_capacity(results.len());
    let mut failures = 0;
    for result in results {
        match result {
            Ok(latency) => latencies.push(latency),
            Err(e) => {
                failures += 1;
                eprintln!("Request failed: {e}");
            }
        }
    }
    latencies.sort();

    Report {
        latencies,
        failures,
        elapsed: start.elapsed(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Items {
            requests,
            concurrency,
        } => {
            let report = drive(requests, concurrency, |i| {
                client.get(format!("{base}/items/{i}"))
            })
            .await;
            report.print("GET /items");
        }
        Commands::Process { requests } => {
            let report = drive(requests, requests, |i| {
                client.post(format!("{base}/process/loadgen-{i}"))
            })
            .await;
            report.print("POST /process");
        }
        Commands::Metrics => {
            let res = client.get(format!("{base}/metrics")).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: /metrics returned status {status}");
                return Ok(());
            }
            let body = res.text().await?;
            for line in body.lines().filter(|l| {
                l.starts_with("http_server_request_duration") || l.starts_with("background_job_duration")
            }) {
                println!("{line}");
            }
        }
    }

    Ok(())
}
