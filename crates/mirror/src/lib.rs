//! Live match mirror pipeline.
//!
//! Pulls the live-event feed on a fixed interval, normalizes it into
//! [`LiveMatch`](oddsy_core::matches::LiveMatch) records and fully replaces a
//! single snapshot in a [`SnapshotStore`]. A failed cycle is logged and
//! skipped; the previous snapshot stays untouched.

pub mod error;
pub mod feed;
pub mod pipeline;
pub mod scheduler;
pub mod store;

pub use error::MirrorError;
pub use feed::FeedClient;
pub use pipeline::MatchMirror;
pub use scheduler::{MirrorHandle, MirrorScheduler};
pub use store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
