//! Server error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use beam_diagrams::RenderError;

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// On-demand render request without source text (client error).
    #[error("Missing mermaid source in request")]
    MissingInput,

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("render task failed: {0}")]
    Task(String),
}

/// JSON error body: `{ "error": … }`.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::Render(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Client mistakes are the caller's problem, not a server fault.
        if status.is_server_error() {
            tracing::error!(error = %self, "render request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
