//! Ad-hoc render endpoints.
//!
//! `GET /render?mermaid=<text>` and `POST /render` with `{ "mermaid": … }`
//! render one diagram on demand, without touching the watched document flow.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use beam_diagrams::{svg_base64, svg_data_url};

use crate::error::ServerError;
use crate::state::AppState;

/// Render request parameters, for both the query string and the JSON body.
#[derive(Debug, Deserialize)]
pub(crate) struct RenderParams {
    mermaid: Option<String>,
}

/// Response for a successful render.
#[derive(Debug, Serialize)]
pub(crate) struct RenderResponse {
    /// Base64-encoded SVG.
    base64: String,
    /// `data:image/svg+xml;base64,…` URL.
    #[serde(rename = "dataUrl")]
    data_url: String,
    /// Raw SVG document.
    svg: String,
}

/// Handle GET /render?mermaid=<text>.
pub(crate) async fn render_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RenderParams>,
) -> Result<Json<RenderResponse>, ServerError> {
    render_impl(&state, params.mermaid).await
}

/// Handle POST /render with a `{ "mermaid": <text> }` body.
pub(crate) async fn render_post(
    State(state): State<Arc<AppState>>,
    Json(params): Json<RenderParams>,
) -> Result<Json<RenderResponse>, ServerError> {
    render_impl(&state, params.mermaid).await
}

/// Shared implementation for both endpoints.
async fn render_impl(
    state: &Arc<AppState>,
    mermaid: Option<String>,
) -> Result<Json<RenderResponse>, ServerError> {
    let source = mermaid
        .filter(|s| !s.trim().is_empty())
        .ok_or(ServerError::MissingInput)?;

    let pipeline = Arc::clone(&state.pipeline);
    let rendered = tokio::task::spawn_blocking(move || pipeline.render_source(&source))
        .await
        .map_err(|e| ServerError::Task(e.to_string()))??;

    Ok(Json(RenderResponse {
        base64: svg_base64(&rendered.svg),
        data_url: svg_data_url(&rendered.svg),
        svg: rendered.svg,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use beam_diagrams::{DiagramRenderer, RenderError, RenderPipeline, RenderedSvg};
    use crate::live_update::UpdateBroadcaster;

    struct StubRenderer;

    impl DiagramRenderer for StubRenderer {
        fn render(&self, source: &str) -> Result<RenderedSvg, RenderError> {
            if source.contains("boom") {
                return Err(RenderError::Http("simulated failure".to_owned()));
            }
            Ok(RenderedSvg {
                svg: r#"<svg width="10" height="10"/>"#.to_owned(),
            })
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            pipeline: Arc::new(RenderPipeline::new(Arc::new(StubRenderer))),
            broadcaster: Arc::new(UpdateBroadcaster::new(8)),
            document: None,
            watcher: None,
        })
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected() {
        let err = render_impl(&state(), None).await.unwrap_err();
        assert!(matches!(err, ServerError::MissingInput));

        let err = render_impl(&state(), Some("   ".to_owned())).await.unwrap_err();
        assert!(matches!(err, ServerError::MissingInput));
    }

    #[tokio::test]
    async fn test_successful_render_returns_all_encodings() {
        let response = render_impl(&state(), Some("graph TD".to_owned()))
            .await
            .expect("render");

        assert_eq!(response.0.svg, r#"<svg width="10" height="10"/>"#);
        assert_eq!(response.0.base64, svg_base64(&response.0.svg));
        assert!(response.0.data_url.starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_render_failure_is_propagated() {
        let err = render_impl(&state(), Some("boom".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Render(_)));
    }
}
