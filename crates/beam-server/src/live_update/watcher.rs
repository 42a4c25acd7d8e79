//! Document change watcher.
//!
//! Watches the parent directory of the configured markdown file and turns
//! debounced change events into render cycles handed to the broadcaster.
//! Watching the directory instead of the file itself means the file may not
//! exist at startup; its later appearance fires like any other change.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use beam_diagrams::RenderPipeline;

use super::broadcaster::UpdateBroadcaster;
use super::debouncer::{ChangeDebouncer, ChangeKind};

/// Default debounce duration in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Interval at which debounced events are drained.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches one document and drives render cycles for it.
pub(crate) struct ChangeWatcher {
    document: PathBuf,
    pipeline: Arc<RenderPipeline>,
    broadcaster: Arc<UpdateBroadcaster>,
    watcher: Option<RecommendedWatcher>,
    debounce_ms: u64,
}

impl ChangeWatcher {
    /// Create a new watcher for the given absolute document path.
    #[must_use]
    pub(crate) fn new(
        document: PathBuf,
        pipeline: Arc<RenderPipeline>,
        broadcaster: Arc<UpdateBroadcaster>,
    ) -> Self {
        Self {
            document,
            pipeline,
            broadcaster,
            watcher: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    /// Start watching.
    ///
    /// Spawns background tasks that record raw filesystem events into the
    /// debouncer and run a render cycle for each drained event. If the
    /// document already exists, an initial cycle runs immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let watch_dir = self
            .document
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let (tx, mut rx) = mpsc::channel::<Event>(100);

        // Create watcher with callback that sends events to channel
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                // Use blocking_send since callback is sync
                let _ = tx.blocking_send(event);
            }
        })?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
        self.watcher = Some(watcher);

        let debouncer = Arc::new(ChangeDebouncer::new(Duration::from_millis(self.debounce_ms)));

        // The document may already exist; that counts as the initial
        // detection and produces the first render cycle.
        if self.document.exists() {
            debouncer.record(ChangeKind::Created);
        }

        // Spawn task to record events into the debouncer
        let document = self.document.clone();
        let debouncer_for_record = Arc::clone(&debouncer);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(kind) = ChangeKind::from_event(&event.kind) else {
                    continue;
                };
                if event.paths.iter().any(|p| is_watched(p, &document)) {
                    debouncer_for_record.record(kind);
                    tracing::debug!(?kind, "recorded filesystem event");
                }
            }
        });

        // Spawn task to drain debounced events into render cycles
        let pipeline = Arc::clone(&self.pipeline);
        let broadcaster = Arc::clone(&self.broadcaster);
        let document = self.document.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);

            loop {
                interval.tick().await;

                match debouncer.take_ready() {
                    Some(ChangeKind::Created | ChangeKind::Modified) => {
                        run_render_cycle(&pipeline, &broadcaster, &document).await;
                    }
                    Some(ChangeKind::Removed) => {
                        tracing::info!(
                            path = %document.display(),
                            "watched document removed, keeping last canvas state"
                        );
                    }
                    None => {}
                }
            }
        });

        Ok(())
    }
}

/// Whether an event path refers to the watched document.
///
/// The watch is non-recursive on the parent directory, so matching the file
/// name is enough; the direct comparison covers the common case where paths
/// are already identical.
fn is_watched(event_path: &Path, document: &Path) -> bool {
    event_path == document || event_path.file_name() == document.file_name()
}

/// Run one render cycle and hand the result to the broadcaster.
///
/// The generation is taken before the document is read so overlapping cycles
/// order by the file state they observed. An unreadable document suppresses
/// the broadcast entirely; the previous canvas state stays untouched.
async fn run_render_cycle(
    pipeline: &Arc<RenderPipeline>,
    broadcaster: &Arc<UpdateBroadcaster>,
    document: &Path,
) {
    let generation = broadcaster.next_generation();
    let start = Instant::now();

    let task_pipeline = Arc::clone(pipeline);
    let path = document.to_path_buf();
    let result = tokio::task::spawn_blocking(move || task_pipeline.process_document(&path)).await;

    match result {
        Ok(Ok(diagrams)) => {
            let count = diagrams.len();
            if broadcaster.publish(generation, &diagrams) {
                tracing::info!(
                    generation,
                    count,
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "render cycle published"
                );
            } else {
                tracing::debug!(generation, "discarding stale render cycle");
            }
        }
        Ok(Err(err)) => {
            tracing::warn!(generation, error = %err, "render cycle produced no output");
        }
        Err(err) => {
            tracing::error!(generation, error = %err, "render cycle task failed");
        }
    }
}
