//! Event debouncing for the watched document.
//!
//! Editors typically emit several filesystem events per save (truncate,
//! write, rename). Because there is exactly one watched file and every cycle
//! reprocesses it from scratch, a single pending slot is enough: bursts
//! coalesce into one event per debounce window.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use notify::EventKind;

/// Kind of change to the watched document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Map a raw notify event kind; access and metadata events are ignored.
    pub(crate) fn from_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(_) => Some(Self::Modified),
            EventKind::Remove(_) => Some(Self::Removed),
            _ => None,
        }
    }
}

/// Event waiting out its debounce window.
struct Pending {
    kind: ChangeKind,
    deadline: Instant,
}

/// Thread-safe single-slot debouncer.
pub(crate) struct ChangeDebouncer {
    pending: Mutex<Option<Pending>>,
    window: Duration,
}

impl ChangeDebouncer {
    /// Create a debouncer with the specified window.
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(None),
            window,
        }
    }

    /// Record an event.
    ///
    /// Thread-safe, can be called from the notify callback path. Each new
    /// event extends the deadline and coalesces with whatever is pending.
    pub(crate) fn record(&self, kind: ChangeKind) {
        let mut pending = self.pending.lock().unwrap();
        let deadline = Instant::now() + self.window;

        *pending = match pending.take() {
            None => Some(Pending { kind, deadline }),
            Some(existing) => {
                Self::coalesce(existing.kind, kind).map(|kind| Pending { kind, deadline })
            }
        };
    }

    /// Coalesce two event kinds.
    ///
    /// Returns `None` if both events cancel out (Created + Removed).
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: ChangeKind, new: ChangeKind) -> Option<ChangeKind> {
        use ChangeKind::{Created, Modified, Removed};

        match (existing, new) {
            // Created + anything
            (Created, Created) => Some(Created),  // Duplicate
            (Created, Modified) => Some(Created), // Content included in create
            (Created, Removed) => None,           // File never existed for us

            // Modified + anything
            (Modified, Created) => Some(Created), // File was recreated
            (Modified, Modified) => Some(Modified), // Normal debounce
            (Modified, Removed) => Some(Removed), // File is gone

            // Removed + anything
            (Removed, Created) => Some(Modified), // File was replaced
            (Removed, Modified) => Some(Removed), // Invalid state, ignore new
            (Removed, Removed) => Some(Removed),  // Duplicate
        }
    }

    /// Take the pending event if its debounce window has passed.
    ///
    /// Thread-safe, called from the async drain loop.
    pub(crate) fn take_ready(&self) -> Option<ChangeKind> {
        let mut pending = self.pending.lock().unwrap();
        if pending
            .as_ref()
            .is_some_and(|p| p.deadline <= Instant::now())
        {
            pending.take().map(|p| p.kind)
        } else {
            None
        }
    }
}
