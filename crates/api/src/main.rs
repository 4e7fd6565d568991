use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use oddsy_api::config::ServerConfig;
use oddsy_api::engine::dispatcher::JobDispatcher;
use oddsy_api::router::build_app_router;
use oddsy_api::state::AppState;
use oddsy_mirror::{
    FeedClient, FileSnapshotStore, MatchMirror, MemorySnapshotStore, MirrorScheduler,
    SnapshotStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // --- Config ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        job_timeout_secs = config.job_timeout_secs,
        request_timeout_secs = config.request_timeout_secs,
        odds_worker = %config.workers.odds.program.display(),
        card_corner_worker = %config.workers.card_corner.program.display(),
        "Configuration loaded"
    );

    // --- Live match mirror ---
    let store: Arc<dyn SnapshotStore> = match &config.mirror.snapshot_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file snapshot store");
            Arc::new(FileSnapshotStore::new(path.clone()))
        }
        None => Arc::new(MemorySnapshotStore::new()),
    };
    let feed = FeedClient::new(config.mirror.feed_url.clone())
        .context("Failed to build feed client")?;
    let mirror = Arc::new(MatchMirror::new(feed, store));

    let mirror_handle = if config.mirror.enabled {
        let interval = Duration::from_secs(config.mirror.interval_secs.max(1));
        tracing::info!(interval_secs = interval.as_secs(), "Mirror scheduler started");
        Some(MirrorScheduler::new(Arc::clone(&mirror), interval).start())
    } else {
        tracing::info!("Mirror scheduler disabled");
        None
    };

    // --- App state ---
    let state = AppState {
        dispatcher: Arc::new(JobDispatcher::new(
            config.workers.clone(),
            config.job_timeout(),
        )),
        mirror,
    };

    // --- Router ---
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(handle) = mirror_handle {
        handle
            .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
            .await;
        tracing::info!("Mirror scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Console logging, filtered by `RUST_LOG`. `LOG_FORMAT=json` switches to
/// one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "oddsy_api=debug,oddsy_core=debug,oddsy_mirror=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let (json_layer, text_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). A handler that
/// cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
