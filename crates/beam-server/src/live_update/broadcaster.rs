//! Update broadcaster.
//!
//! Fans out each accepted render cycle to all connected consumers and keeps
//! the latest payload so a freshly connected session sees current state
//! without waiting for the next file change.
//!
//! Render cycles are tagged with a monotonically increasing generation
//! number taken before the document is read. When cycles overlap (a new file
//! change arriving mid-cycle), the one carrying the lower generation is
//! discarded at publish time, so the canvas always converges to the latest
//! document content regardless of completion order.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

use beam_diagrams::RenderedDiagram;

/// Message pushed to connected consumers on every accepted render cycle.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct UpdateMessage {
    /// Event type (always "update").
    #[serde(rename = "type")]
    event_type: String,
    /// Ordered diagram list for the whole document.
    diagrams: Vec<DiagramPayload>,
}

/// One diagram in an update message.
#[derive(Clone, Debug, Serialize)]
struct DiagramPayload {
    index: usize,
    label: String,
    #[serde(rename = "dataUrl")]
    data_url: String,
}

impl UpdateMessage {
    fn new(diagrams: &[RenderedDiagram]) -> Self {
        Self {
            event_type: "update".to_owned(),
            diagrams: diagrams
                .iter()
                .map(|d| DiagramPayload {
                    index: d.index,
                    label: d.label.clone(),
                    data_url: d.data_url.clone(),
                })
                .collect(),
        }
    }

    /// Number of diagrams carried by the message.
    pub(crate) fn diagram_count(&self) -> usize {
        self.diagrams.len()
    }
}

/// Latest accepted cycle.
#[derive(Default)]
struct Latest {
    generation: u64,
    snapshot: Option<UpdateMessage>,
}

/// Owns the fan-out channel and the latest-snapshot slot.
///
/// Created at server start, dropped at server stop; connected-consumer
/// bookkeeping lives in the channel, not in an ambient global.
pub(crate) struct UpdateBroadcaster {
    sender: broadcast::Sender<UpdateMessage>,
    generations: AtomicU64,
    latest: Mutex<Latest>,
}

impl UpdateBroadcaster {
    /// Create a broadcaster with the given channel capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            generations: AtomicU64::new(0),
            latest: Mutex::new(Latest::default()),
        }
    }

    /// Take the generation number for a new render cycle.
    ///
    /// Must be called before the cycle reads the document, so overlapping
    /// cycles order by the file state they observed.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a completed render cycle.
    ///
    /// Returns `false` (and sends nothing) when a newer generation has
    /// already been published. Delivery is best-effort per consumer; a
    /// consumer that went away simply stops receiving.
    pub(crate) fn publish(&self, generation: u64, diagrams: &[RenderedDiagram]) -> bool {
        let message = UpdateMessage::new(diagrams);

        {
            let mut latest = self.latest.lock().unwrap();
            if generation <= latest.generation {
                return false;
            }
            latest.generation = generation;
            latest.snapshot = Some(message.clone());
        }

        // No receivers connected is fine; the snapshot is kept either way.
        let _ = self.sender.send(message);
        true
    }

    /// Latest accepted payload, if any cycle has completed yet.
    pub(crate) fn snapshot(&self) -> Option<UpdateMessage> {
        self.latest.lock().unwrap().snapshot.clone()
    }

    /// Get a receiver for update messages.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<UpdateMessage> {
        self.sender.subscribe()
    }
}
