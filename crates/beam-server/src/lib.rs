//! HTTP and WebSocket server for beam.
//!
//! Serves the synchronization pipeline over two surfaces:
//! - `/render` (GET and POST) for ad-hoc mermaid rendering
//! - `/ws` for live diagram updates driven by the watched document
//!
//! # Architecture
//!
//! ```text
//! file change ──► ChangeWatcher ──► RenderPipeline ──► UpdateBroadcaster
//!                  (notify +         (extract +          (generation-
//!                   debounce)         render)             sequenced fan-out)
//!                                                            │
//! Browser ◄──── WebSocket /ws ◄──────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use beam_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         document: Some(PathBuf::from("shaping-doc.md")),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod live_update;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use beam_config::RendererMode;
use beam_diagrams::{DiagramRenderer, KrokiRenderer, MmdcRenderer, RenderPipeline};

use live_update::{ChangeWatcher, UpdateBroadcaster};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Absolute path of the markdown document to watch (`None` runs the
    /// server in ad-hoc render mode only).
    pub document: Option<PathBuf>,
    /// Rendering backend.
    pub renderer_mode: RendererMode,
    /// Kroki server URL (required for the kroki backend).
    pub kroki_url: Option<String>,
    /// Path to the mmdc binary (for the mmdc backend).
    pub mmdc_path: PathBuf,
    /// HTTP timeout for the kroki backend.
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3456,
            document: None,
            renderer_mode: RendererMode::Mmdc,
            kroki_url: None,
            mmdc_path: PathBuf::from("mmdc"),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let renderer: Arc<dyn DiagramRenderer> = match config.renderer_mode {
        RendererMode::Mmdc => Arc::new(MmdcRenderer::new(config.mmdc_path.clone())),
        RendererMode::Kroki => {
            let url = config
                .kroki_url
                .clone()
                .ok_or("kroki renderer selected but no kroki_url configured")?;
            Arc::new(KrokiRenderer::with_timeout(url, config.timeout))
        }
    };

    let pipeline = Arc::new(RenderPipeline::new(renderer));
    let broadcaster = Arc::new(UpdateBroadcaster::new(100));

    // Create the watcher if a document is configured
    let watcher = if let Some(document) = &config.document {
        let mut watcher = ChangeWatcher::new(
            document.clone(),
            Arc::clone(&pipeline),
            Arc::clone(&broadcaster),
        );
        watcher.start()?;
        tracing::info!(path = %document.display(), "watching document");
        Some(watcher)
    } else {
        None
    };

    // Create app state
    let state = Arc::new(AppState {
        pipeline,
        broadcaster,
        document: config.document.clone(),
        watcher,
    });

    // Create router
    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from a beam config.
///
/// # Arguments
///
/// * `config` - beam configuration
/// * `document` - Resolved document path, if one was given on the CLI
#[must_use]
pub fn server_config_from_config(
    config: &beam_config::Config,
    document: Option<PathBuf>,
) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        document,
        renderer_mode: config.renderer.mode,
        kroki_url: config.renderer.kroki_url.clone(),
        mmdc_path: config.renderer.mmdc_path.clone(),
        timeout: Duration::from_secs(config.renderer.timeout_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_config_maps_all_fields() {
        let mut config = beam_config::Config::default();
        config.server.port = 4001;
        config.renderer.kroki_url = Some("https://kroki.io".to_owned());
        config.renderer.mode = RendererMode::Kroki;
        config.renderer.timeout_secs = 5;

        let document = Some(PathBuf::from("/docs/doc.md"));
        let server_config = server_config_from_config(&config, document.clone());

        assert_eq!(server_config.port, 4001);
        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.document, document);
        assert_eq!(server_config.renderer_mode, RendererMode::Kroki);
        assert_eq!(server_config.kroki_url.as_deref(), Some("https://kroki.io"));
        assert_eq!(server_config.timeout, Duration::from_secs(5));
    }
}
