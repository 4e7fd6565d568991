//! Snapshot storage.
//!
//! A store holds at most one [`LiveMatchSnapshot`] and only supports replacing
//! it as a whole. The store assigns `last_update` at replace time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use oddsy_core::matches::{LiveMatch, LiveMatchSnapshot};
use tokio::sync::{Mutex, RwLock};

use crate::error::MirrorError;

/// Storage for the single current snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Atomically replace the snapshot with `matches`, stamped with the
    /// current time. Returns the stored snapshot.
    async fn replace(&self, matches: Vec<LiveMatch>) -> Result<LiveMatchSnapshot, MirrorError>;

    /// The current snapshot, if any cycle has succeeded yet.
    async fn current(&self) -> Result<Option<LiveMatchSnapshot>, MirrorError>;
}

/// In-process store. Readers get either the old or the new snapshot.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshot: RwLock<Option<Arc<LiveMatchSnapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn replace(&self, matches: Vec<LiveMatch>) -> Result<LiveMatchSnapshot, MirrorError> {
        let snapshot = Arc::new(LiveMatchSnapshot::now(matches));
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        Ok((*snapshot).clone())
    }

    async fn current(&self) -> Result<Option<LiveMatchSnapshot>, MirrorError> {
        Ok(self.snapshot.read().await.as_deref().cloned())
    }
}

/// JSON file store. Writes go to a sibling temp file which is then renamed
/// over the target, so a reader never observes a half-written document.
///
/// Writers are serialized: the scheduled cycle and an on-demand refresh share
/// the one temp file.
pub struct FileSnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn replace(&self, matches: Vec<LiveMatch>) -> Result<LiveMatchSnapshot, MirrorError> {
        let snapshot = LiveMatchSnapshot::now(matches);
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let _writing = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(snapshot)
    }

    async fn current(&self) -> Result<Option<LiveMatchSnapshot>, MirrorError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
