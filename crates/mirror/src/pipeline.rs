//! One mirror cycle: fetch, normalize, replace.

use std::sync::Arc;

use oddsy_core::matches::LiveMatchSnapshot;

use crate::error::MirrorError;
use crate::feed::{normalize, FeedClient};
use crate::store::SnapshotStore;

/// Ties the feed to the snapshot store.
pub struct MatchMirror {
    feed: FeedClient,
    store: Arc<dyn SnapshotStore>,
}

impl MatchMirror {
    pub fn new(feed: FeedClient, store: Arc<dyn SnapshotStore>) -> Self {
        Self { feed, store }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Run a single cycle.
    ///
    /// The store is only touched after the feed has been fetched and fully
    /// normalized, so any failure leaves the previous snapshot in place.
    pub async fn run_cycle(&self) -> Result<LiveMatchSnapshot, MirrorError> {
        let events = self.feed.fetch().await?;
        let matches = normalize(events);
        let snapshot = self.store.replace(matches).await?;

        tracing::info!(
            count = snapshot.matches.len(),
            feed = self.feed.url(),
            "Live matches updated"
        );

        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
