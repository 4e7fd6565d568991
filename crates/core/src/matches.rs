//! Live match data model shared by the mirror pipeline and the API.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// One normalized live match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatch {
    pub id: String,
    pub league: String,
    pub country: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i64,
    pub away_score: i64,
    /// Feed status type, e.g. `inprogress`.
    pub status: String,
}

/// The single current-state record of live matches.
///
/// A snapshot is only ever replaced as a whole; there is no API to patch the
/// match list of an existing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatchSnapshot {
    pub matches: Vec<LiveMatch>,
    pub last_update: Timestamp,
}

impl LiveMatchSnapshot {
    /// Stamp `matches` with the current time.
    pub fn now(matches: Vec<LiveMatch>) -> Self {
        Self {
            matches,
            last_update: chrono::Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
