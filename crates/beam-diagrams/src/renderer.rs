//! Renderer contract.
//!
//! Wraps the actual diagram-to-image backend behind a uniform interface so
//! the pipeline and the server do not care whether rendering happens through
//! the mermaid CLI or a Kroki service.

/// A successfully rendered diagram image.
#[derive(Debug, Clone)]
pub struct RenderedSvg {
    /// SVG document as a string.
    pub svg: String,
}

/// Single diagram rendering error.
///
/// Carries enough detail to be logged per block without aborting sibling
/// renders.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Command {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Uniform rendering contract: diagram source text in, SVG out.
///
/// Implementations must be safe for concurrent invocation and must clean up
/// any temporary resources on both success and failure paths.
pub trait DiagramRenderer: Send + Sync {
    /// Render one mermaid source text to SVG.
    fn render(&self, source: &str) -> Result<RenderedSvg, RenderError>;
}
