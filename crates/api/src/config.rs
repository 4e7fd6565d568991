use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use oddsy_core::error::CoreError;
use oddsy_core::jobs::{WorkerSpec, WorkerTable};
use oddsy_mirror::feed::DEFAULT_FEED_URL;

/// Default hard deadline for a worker: scraping is slow.
const DEFAULT_JOB_TIMEOUT_SECS: u64 = 600;

/// Slack added on top of the job timeout for the HTTP request timeout.
const REQUEST_TIMEOUT_SLACK_SECS: u64 = 30;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Invalid CORS origin '{0}'")]
    CorsOrigin(String),

    #[error("Invalid worker configuration: {0}")]
    Worker(#[from] CoreError),
}

/// Data mirror settings.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Run the recurring mirror inside this process (default: `false`).
    pub enabled: bool,
    pub feed_url: String,
    /// Seconds between cycles (default: `30`).
    pub interval_secs: u64,
    /// Persist the snapshot to this JSON file; in-memory when `None`.
    pub snapshot_path: Option<PathBuf>,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to the bot scripts.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Worker deadline in seconds (default: `600`).
    pub job_timeout_secs: u64,
    /// HTTP request timeout in seconds (default: job timeout + 30).
    pub request_timeout_secs: u64,
    /// How long background services get to stop on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub workers: WorkerTable,
    pub mirror: MirrorConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3001`                  |
    /// | `CORS_ORIGINS`                  | `*`                     |
    /// | `JOB_TIMEOUT_SECS`              | `600`                   |
    /// | `REQUEST_TIMEOUT_SECS`          | job timeout + 30        |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `ODDS_WORKER_PROGRAM`           | `python`                |
    /// | `ODDS_WORKER_ARGS`              | `main.py`               |
    /// | `ODDS_WORKER_DIR`               | `.`                     |
    /// | `CARD_CORNER_WORKER_PROGRAM`    | `python`                |
    /// | `CARD_CORNER_WORKER_ARGS`       | `main.py`               |
    /// | `CARD_CORNER_WORKER_DIR`        | `istatistik`            |
    /// | `MIRROR_ENABLED`                | `false`                 |
    /// | `MIRROR_FEED_URL`               | SofaScore live football |
    /// | `MIRROR_INTERVAL_SECS`          | `30`                    |
    /// | `SNAPSHOT_PATH`                 | unset (in-memory)       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port: u16 = parse(&lookup, "PORT", 3001, "a valid port number")?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let job_timeout_secs: u64 = parse(
            &lookup,
            "JOB_TIMEOUT_SECS",
            DEFAULT_JOB_TIMEOUT_SECS,
            "a positive number of seconds",
        )?;
        if job_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "JOB_TIMEOUT_SECS",
                expected: "a positive number of seconds",
                value: "0".to_string(),
            });
        }

        let request_timeout_secs: u64 = parse(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            job_timeout_secs.saturating_add(REQUEST_TIMEOUT_SLACK_SECS),
            "a number of seconds",
        )?;
        let shutdown_timeout_secs: u64 =
            parse(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30, "a number of seconds")?;

        let workers = WorkerTable {
            odds: WorkerSpec::new(
                var("ODDS_WORKER_PROGRAM", "python"),
                split_args(&var("ODDS_WORKER_ARGS", "main.py")),
                var("ODDS_WORKER_DIR", "."),
            )?,
            card_corner: WorkerSpec::new(
                var("CARD_CORNER_WORKER_PROGRAM", "python"),
                split_args(&var("CARD_CORNER_WORKER_ARGS", "main.py")),
                var("CARD_CORNER_WORKER_DIR", "istatistik"),
            )?,
        };

        let mirror = MirrorConfig {
            enabled: parse(&lookup, "MIRROR_ENABLED", false, "true or false")?,
            feed_url: var("MIRROR_FEED_URL", DEFAULT_FEED_URL),
            interval_secs: parse(&lookup, "MIRROR_INTERVAL_SECS", 30, "a number of seconds")?,
            snapshot_path: lookup("SNAPSHOT_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            job_timeout_secs,
            request_timeout_secs,
            shutdown_timeout_secs,
            workers,
            mirror,
        })
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
