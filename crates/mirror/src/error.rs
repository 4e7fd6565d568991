/// Errors from a single mirror cycle.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("Feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed returned a non-2xx status code.
    #[error("Feed error ({status}): {body}")]
    FeedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Reading or writing the persisted snapshot failed.
    #[error("Snapshot storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// The persisted snapshot could not be (de)serialized.
    #[error("Snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
