//! Presentation surface seam.
//!
//! The reconciler only computes actions; drawing is the presentation layer's
//! job. Implement [`CanvasSurface`] over whatever actually renders shapes.

use crate::action::CanvasAction;

/// Something that can realize reconciliation actions.
pub trait CanvasSurface {
    /// Apply one action.
    fn apply(&mut self, action: &CanvasAction);

    /// Apply a full reconciliation's actions in order.
    fn apply_all(&mut self, actions: &[CanvasAction]) {
        for action in actions {
            self.apply(action);
        }
    }
}

/// Surface that records every applied action.
///
/// Useful as a reference implementation and in tests asserting on the exact
/// side-effect sequence.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Actions applied so far, in order.
    pub applied: Vec<CanvasAction>,
}

impl RecordingSurface {
    /// Create an empty recording surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CanvasSurface for RecordingSurface {
    fn apply(&mut self, action: &CanvasAction) {
        self.applied.push(action.clone());
    }
}
