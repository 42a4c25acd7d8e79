//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use beam_diagrams::RenderPipeline;

use crate::live_update::{ChangeWatcher, UpdateBroadcaster};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Render pipeline for the watched document and ad-hoc requests.
    pub(crate) pipeline: Arc<RenderPipeline>,
    /// Update broadcaster (owned here for the server's lifetime).
    pub(crate) broadcaster: Arc<UpdateBroadcaster>,
    /// Watched document, if one was configured.
    pub(crate) document: Option<PathBuf>,
    /// Keeps the filesystem watcher alive while the server runs.
    #[allow(dead_code)]
    pub(crate) watcher: Option<ChangeWatcher>,
}
