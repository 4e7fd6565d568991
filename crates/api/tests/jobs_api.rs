//! Integration tests for job triggers and the active-jobs listing.

mod common;

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use common::{bash_workers, body_json, build_test_app, get, post, test_config};
use oddsy_core::jobs::{WorkerSpec, WorkerTable};

// ---------------------------------------------------------------------------
// Terminal outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_worker_returns_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "echo hello", "echo cards"));
    let app = build_test_app(&config);

    let response = post(app, "/jobs/oran").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["output"], "hello");
    assert_eq!(json["message"], "Script completed successfully");
    assert_eq!(json["truncated"], false);
}

#[tokio::test]
async fn failing_worker_returns_stderr_and_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(
        dir.path(),
        "echo partial; echo boom >&2; exit 1",
        "echo cards",
    ));
    let app = build_test_app(&config);

    let response = post(app, "/jobs/oran").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "boom");
    assert_eq!(json["code"], 1);
    assert_eq!(json["timedOut"], false);
    assert_eq!(json["reason"], "non_zero_exit");
}

#[tokio::test]
async fn slow_worker_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(bash_workers(dir.path(), "sleep 30", "echo cards"));
    config.job_timeout_secs = 1;
    let app = build_test_app(&config);

    let started = Instant::now();
    let response = post(app, "/jobs/oran").await;
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["timedOut"], true);
    assert_eq!(json["code"], serde_json::Value::Null);
    assert_eq!(json["reason"], "timeout");
    assert_eq!(json["message"], "Script timed out after 1s");
}

#[tokio::test]
async fn missing_program_is_a_launch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let spec = WorkerSpec::new("/nonexistent/python", vec!["main.py".into()], dir.path()).unwrap();
    let config = test_config(WorkerTable {
        odds: spec.clone(),
        card_corner: spec,
    });
    let app = build_test_app(&config);

    let response = post(app.clone(), "/jobs/oran").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["reason"], "launch_failure");
    assert_eq!(json["code"], serde_json::Value::Null);
    assert_eq!(json["timedOut"], false);

    let active = body_json(get(app, "/jobs").await).await;
    assert_eq!(active["data"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_kind_is_rejected_without_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let script = format!("touch {}", marker.display());
    let config = test_config(bash_workers(dir.path(), &script, &script));
    let app = build_test_app(&config);

    let response = post(app.clone(), "/jobs/basketball").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["reason"], "configuration_error");
    assert!(json["error"].as_str().unwrap().contains("basketball"));

    assert!(!marker.exists());
    let active = body_json(get(app, "/jobs").await).await;
    assert_eq!(active["data"], serde_json::json!([]));
}

#[tokio::test]
async fn card_corner_runs_in_its_own_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "pwd", "pwd"));
    let app = build_test_app(&config);

    let json = body_json(post(app, "/jobs/kart-korner").await).await;
    assert_eq!(json["success"], true);
    assert!(json["output"].as_str().unwrap().ends_with("/istatistik"));
}

#[tokio::test]
async fn worker_sees_job_environment() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(
        dir.path(),
        "echo \"$JOB_KIND $PYTHONUNBUFFERED\"",
        "echo cards",
    ));
    let app = build_test_app(&config);

    let json = body_json(post(app, "/jobs/oran").await).await;
    assert_eq!(json["output"], "oran 1");
}

#[tokio::test]
async fn legacy_routes_run_their_workers() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "echo odds", "echo cards"));
    let app = build_test_app(&config);

    let odds = body_json(post(app.clone(), "/api/run-oran").await).await;
    assert_eq!(odds["success"], true);
    assert_eq!(odds["output"], "odds");

    let cards = body_json(post(app, "/api/run-kart-korner").await).await;
    assert_eq!(cards["success"], true);
    assert_eq!(cards["output"], "cards");
}

#[tokio::test]
async fn trigger_requires_post() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "echo odds", "echo cards"));
    let app = build_test_app(&config);

    let response = get(app, "/jobs/oran").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn different_kinds_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(
        dir.path(),
        "sleep 1; echo odds",
        "sleep 1; echo cards",
    ));
    let app = build_test_app(&config);

    let started = Instant::now();
    let (odds, cards) = tokio::join!(
        post(app.clone(), "/jobs/oran"),
        post(app.clone(), "/jobs/kart-korner"),
    );
    let elapsed = started.elapsed();

    assert_eq!(odds.status(), StatusCode::OK);
    assert_eq!(cards.status(), StatusCode::OK);
    assert_eq!(body_json(odds).await["output"], "odds");
    assert_eq!(body_json(cards).await["output"], "cards");
    assert!(elapsed < Duration::from_millis(1900), "took {elapsed:?}");
}

/// Poll GET /jobs until `check` accepts the listing.
async fn wait_for_jobs(
    app: &axum::Router,
    check: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let json = body_json(get(app.clone(), "/jobs").await).await;
        if check(&json["data"]) {
            return json;
        }
        assert!(Instant::now() < deadline, "condition never met: {json}");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn same_kind_is_busy_while_running() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "sleep 1; echo odds", "echo cards"));
    let app = build_test_app(&config);

    let first = tokio::spawn(post(app.clone(), "/jobs/oran"));
    wait_for_jobs(&app, |data| data.as_array().is_some_and(|a| a.len() == 1)).await;

    let second = post(app.clone(), "/jobs/oran").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["reason"], "busy");
    assert_eq!(json["success"], false);

    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // The kind is free again once the first run finished.
    let third = post(app, "/jobs/oran").await;
    assert_eq!(third.status(), StatusCode::OK);
}

#[tokio::test]
async fn active_jobs_expose_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(
        dir.path(),
        "echo started; sleep 1; echo finished",
        "echo cards",
    ));
    let app = build_test_app(&config);

    let running = tokio::spawn(post(app.clone(), "/jobs/oran"));
    let json = wait_for_jobs(&app, |data| {
        data[0]["stdoutTail"]
            .as_str()
            .is_some_and(|tail| tail.contains("started"))
    })
    .await;

    let job = &json["data"][0];
    assert_eq!(job["kind"], "oran");
    assert!(job["id"].is_string());
    assert!(job["startedAt"].is_string());
    assert!(!job["stdoutTail"].as_str().unwrap().contains("finished"));

    let done = body_json(running.await.unwrap()).await;
    assert_eq!(done["output"], "started\nfinished");

    wait_for_jobs(&app, |data| data.as_array().is_some_and(Vec::is_empty)).await;
}
