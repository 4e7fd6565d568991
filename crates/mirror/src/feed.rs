//! Live-event feed client and normalization.
//!
//! The feed returns `{ "events": [...] }` where each event nests its
//! tournament, category, teams, scores and status. [`normalize`] flattens that
//! into [`LiveMatch`] rows; absent scores become 0.

use std::time::Duration;

use oddsy_core::matches::LiveMatch;
use serde::Deserialize;

use crate::error::MirrorError;

/// SofaScore's live football endpoint.
pub const DEFAULT_FEED_URL: &str = "https://www.sofascore.com/api/v1/sport/football/events/live";

/// Per-request timeout for a feed fetch.
const FEED_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Top-level feed payload.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub events: Vec<FeedEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEvent {
    pub id: i64,
    pub tournament: Tournament,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub home_score: Option<Score>,
    #[serde(default)]
    pub away_score: Option<Score>,
    pub status: EventStatus,
}

#[derive(Debug, Deserialize)]
pub struct Tournament {
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Team {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub current: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EventStatus {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Flatten feed events into live matches, preserving feed order.
pub fn normalize(events: Vec<FeedEvent>) -> Vec<LiveMatch> {
    events
        .into_iter()
        .map(|event| LiveMatch {
            id: event.id.to_string(),
            league: event.tournament.name,
            country: event.tournament.category.name,
            home_team: event.home_team.name,
            away_team: event.away_team.name,
            home_score: current_score(event.home_score.as_ref()),
            away_score: current_score(event.away_score.as_ref()),
            status: event.status.kind,
        })
        .collect()
}

fn current_score(score: Option<&Score>) -> i64 {
    score.and_then(|s| s.current).unwrap_or(0)
}

/// HTTP client for the live-event feed.
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// Create a client for `url` with a browser-like user agent (the public
    /// feed rejects requests without one).
    pub fn new(url: impl Into<String>) -> Result<Self, MirrorError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oddsy-mirror/", env!("CARGO_PKG_VERSION"), " (Mozilla/5.0)"))
            .timeout(FEED_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current list of live events.
    pub async fn fetch(&self) -> Result<Vec<FeedEvent>, MirrorError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MirrorError::FeedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.json::<FeedResponse>().await?;
        Ok(payload.events)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
