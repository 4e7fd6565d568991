use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use oddsy_mirror::MirrorError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Job trigger endpoints never use this: they always answer with the job
/// envelope (see [`crate::handlers::jobs`]). Implements [`IntoResponse`] to
/// produce consistent `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The snapshot store could not be read.
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// The requested resource does not exist (yet).
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Mirror(err) => {
                tracing::error!(error = %err, "Snapshot store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
