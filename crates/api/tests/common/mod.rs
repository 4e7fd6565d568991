#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use oddsy_api::config::{MirrorConfig, ServerConfig};
use oddsy_api::engine::dispatcher::JobDispatcher;
use oddsy_api::router::build_app_router;
use oddsy_api::state::AppState;
use oddsy_core::jobs::{WorkerSpec, WorkerTable};
use oddsy_mirror::{FeedClient, MatchMirror, MemorySnapshotStore};

/// A feed URL nothing listens on.
pub const UNREACHABLE_FEED: &str = "http://127.0.0.1:9/live";

/// Build a test `ServerConfig` with safe defaults.
///
/// Wildcard CORS, a 30-second job timeout and a request timeout that
/// outlasts it.
pub fn test_config(workers: WorkerTable) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        job_timeout_secs: 30,
        request_timeout_secs: 60,
        shutdown_timeout_secs: 5,
        workers,
        mirror: MirrorConfig {
            enabled: false,
            feed_url: UNREACHABLE_FEED.to_string(),
            interval_secs: 30,
            snapshot_path: None,
        },
    }
}

/// Build the full application router with all middleware layers, exactly as
/// `main.rs` does, backed by an in-memory snapshot store.
pub fn build_test_app(config: &ServerConfig) -> Router {
    let feed = FeedClient::new(config.mirror.feed_url.clone()).unwrap();
    let state = AppState {
        dispatcher: Arc::new(JobDispatcher::new(
            config.workers.clone(),
            config.job_timeout(),
        )),
        mirror: Arc::new(MatchMirror::new(
            feed,
            Arc::new(MemorySnapshotStore::new()),
        )),
    };
    build_app_router(state, config).unwrap()
}

/// Write `body` as `<dir>/<name>` and return a spec running it with bash
/// from `dir`.
pub fn bash_worker(dir: &Path, name: &str, body: &str) -> WorkerSpec {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), format!("#!/bin/bash\n{body}\n")).unwrap();
    WorkerSpec::new("bash", vec![name.to_string()], dir).unwrap()
}

/// Worker table whose odds and card/corner workers run the given scripts.
///
/// The card/corner worker runs from an `istatistik` subdirectory.
pub fn bash_workers(dir: &Path, odds: &str, card_corner: &str) -> WorkerTable {
    WorkerTable {
        odds: bash_worker(dir, "odds.sh", odds),
        card_corner: bash_worker(&dir.join("istatistik"), "card_corner.sh", card_corner),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
