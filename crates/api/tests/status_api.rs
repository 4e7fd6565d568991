//! Integration tests for liveness and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, bash_workers, build_test_app, get, test_config};
use tower::ServiceExt;

fn app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "echo odds", "echo cards"));
    (dir, build_test_app(&config))
}

// ---------------------------------------------------------------------------
// Test: GET /status and the legacy path report online
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_online() {
    let (_dir, app) = app();

    for path in ["/status", "/api/status"] {
        let response = get(app.clone(), path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "status": "online" }),
            "{path}"
        );
    }
}

// ---------------------------------------------------------------------------
// Test: status answers while a job is running
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_is_independent_of_running_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(bash_workers(dir.path(), "sleep 2", "echo cards"));
    let app = build_test_app(&config);

    let running = tokio::spawn(common::post(app.clone(), "/jobs/oran"));
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let started = std::time::Instant::now();
    let response = get(app, "/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() < std::time::Duration::from_secs(1));

    assert_eq!(running.await.unwrap().status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_dir, app) = app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (_dir, app) = app();
    let response = get(app, "/status").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // MakeRequestUuid produces a hyphenated UUID.
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn client_request_id_is_propagated() {
    let (_dir, app) = app();
    let request = Request::builder()
        .uri("/status")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

// ---------------------------------------------------------------------------
// Test: CORS
// ---------------------------------------------------------------------------

fn preflight(origin: &str, path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(path)
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn wildcard_cors_allows_any_origin() {
    let (_dir, app) = app();
    let response = app
        .oneshot(preflight("http://dashboard.example", "/jobs/oran"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn configured_origin_is_echoed() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(bash_workers(dir.path(), "echo odds", "echo cards"));
    config.cors_origins = vec!["http://localhost:5173".to_string()];
    let app = build_test_app(&config);

    let response = app
        .oneshot(preflight("http://localhost:5173", "/jobs/oran"))
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
}
