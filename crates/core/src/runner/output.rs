//! Append-only output accumulation for a single worker stream.
//!
//! [`OutputBuffer`] is the write side and is not `Clone`: the runner's reader
//! task is its only writer. Any number of read-only [`OutputHandle`]s can be
//! taken to observe partial output while the worker is still running.

use std::sync::Arc;

use tokio::sync::RwLock;

/// Maximum bytes captured per stream (10 MiB).
///
/// Bytes past this limit are still drained from the pipe so the worker never
/// blocks on a full pipe, but they are discarded.
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Write side of a stream accumulator.
#[derive(Debug)]
pub struct OutputBuffer {
    captured: Arc<RwLock<Captured>>,
    limit: usize,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::with_limit(MAX_OUTPUT_BYTES)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            captured: Arc::new(RwLock::new(Captured::default())),
            limit,
        }
    }

    /// Append a chunk, keeping at most `limit` bytes in total.
    pub async fn append(&self, chunk: &[u8]) {
        let mut captured = self.captured.write().await;
        let room = self.limit.saturating_sub(captured.bytes.len());
        if chunk.len() > room {
            captured.truncated = true;
        }
        let take = chunk.len().min(room);
        captured.bytes.extend_from_slice(&chunk[..take]);
    }

    /// A read-only view onto this buffer.
    pub fn handle(&self) -> OutputHandle {
        OutputHandle {
            captured: Arc::clone(&self.captured),
        }
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of a stream accumulator.
#[derive(Debug, Clone)]
pub struct OutputHandle {
    captured: Arc<RwLock<Captured>>,
}

impl OutputHandle {
    /// Number of bytes captured so far.
    pub async fn len(&self) -> usize {
        self.captured.read().await.bytes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_truncated(&self) -> bool {
        self.captured.read().await.truncated
    }

    /// Everything captured so far, decoded lossily as UTF-8.
    pub async fn text(&self) -> String {
        String::from_utf8_lossy(&self.captured.read().await.bytes).into_owned()
    }

    /// At most the last `max_bytes` bytes captured, decoded lossily as UTF-8.
    ///
    /// The cut is moved forward past any continuation bytes so the tail never
    /// starts in the middle of a character.
    pub async fn tail(&self, max_bytes: usize) -> String {
        let captured = self.captured.read().await;
        let bytes = &captured.bytes;
        let mut start = bytes.len().saturating_sub(max_bytes);
        while start < bytes.len() && is_continuation(bytes[start]) {
            start += 1;
        }
        String::from_utf8_lossy(&bytes[start..]).into_owned()
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
