//! End-to-end behaviour of the routes over a real socket.

use std::time::{Duration, Instant};

use latency_demo::config::Mode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_items_echo_id_in_both_modes() {
    let client = common::client();

    for (mode, label) in [(Mode::Bottlenecks, "bottlenecks"), (Mode::Optimized, "optimized")] {
        let service = common::spawn_service(common::instant_config(mode));

        for id in [0i64, 1, -1, 42, i64::MAX, i64::MIN] {
            let res = client
                .get(service.url(&format!("/items/{id}")))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), 200);

            let body: Value = res.json().await.unwrap();
            assert_eq!(body["item_id"].as_i64(), Some(id));
            assert_eq!(body["status"], "ok");
            assert_eq!(body["mode"], label);
        }
    }
}

#[tokio::test]
async fn test_items_rejects_values_that_are_not_i64() {
    let service = common::spawn_service(common::instant_config(Mode::Optimized));
    let client = common::client();

    for raw in ["abc", "1.5", "99999999999999999999"] {
        let res = client
            .get(service.url(&format!("/items/{raw}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 422, "path {raw}");
        let body: Value = res.json().await.unwrap();
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn test_process_returns_before_job_finishes() {
    let client = common::client();

    let job = Duration::from_millis(3_000);

    for mode in [Mode::Bottlenecks, Mode::Optimized] {
        let mut config = common::instant_config(mode);
        config.workload.background_job_ms = Some(job.as_millis() as u64);
        let service = common::spawn_service(config);

        let start = Instant::now();
        let res = client
            .post(service.url("/process/report-7"))
            .send()
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "queued");
        assert_eq!(body["task_id"], "report-7");
        assert_eq!(body["mode"], mode.as_str());
        assert!(
            elapsed < job / 10,
            "{mode} /process took {elapsed:?} with a {job:?} job queued"
        );
    }
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let service = common::spawn_service(common::instant_config(Mode::Optimized));
    let client = common::client();

    let res = client.get(service.url("/items/1")).send().await.unwrap();
    let generated = res
        .headers()
        .get("x-request-id")
        .expect("missing x-request-id")
        .to_str()
        .unwrap()
        .to_string();
    assert!(!generated.is_empty());

    let res = client
        .get(service.url("/items/2"))
        .header("x-request-id", "client-chosen")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "client-chosen");
}
