//! Rendering via a Kroki service.
//!
//! POSTs mermaid source to `{server}/mermaid/svg` with a pooled HTTP agent.

use std::time::Duration;

use ureq::Agent;

use crate::renderer::{DiagramRenderer, RenderError, RenderedSvg};

/// Default HTTP timeout for Kroki requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Renderer backed by a Kroki service.
pub struct KrokiRenderer {
    server_url: String,
    agent: Agent,
}

impl KrokiRenderer {
    /// Create a renderer for the given Kroki server URL
    /// (e.g. `https://kroki.io`).
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_timeout(server_url, DEFAULT_TIMEOUT)
    }

    /// Create a renderer with an explicit HTTP timeout.
    #[must_use]
    pub fn with_timeout(server_url: impl Into<String>, timeout: Duration) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_owned();
        Self {
            server_url,
            agent: create_agent(timeout),
        }
    }
}

/// Create an HTTP agent with the specified timeout.
///
/// The agent is reused across render calls for connection pooling.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl DiagramRenderer for KrokiRenderer {
    fn render(&self, source: &str) -> Result<RenderedSvg, RenderError> {
        let url = format!("{}/mermaid/svg", self.server_url);

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Http(format!("HTTP {status}: {error_body}")));
        }

        let svg = body
            .read_to_string()
            .map_err(|e| RenderError::Http(e.to_string()))?;

        Ok(RenderedSvg { svg })
    }
}
