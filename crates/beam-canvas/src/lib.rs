//! Canvas reconciliation for beam diagram updates.
//!
//! A [`Reconciler`] consumes the ordered diagram list produced by the render
//! pipeline and computes the minimal set of create/update/delete actions
//! needed to make a presentation surface match it:
//! - unchanged diagrams produce no actions
//! - changed diagrams are updated in place (identifiers derived from the
//!   diagram index are stable across cycles, so frames are never torn down
//!   just because their content changed)
//! - diagrams missing from the new list are deleted, after the
//!   creates/updates
//! - new diagrams are laid out in a vertical band stack without disturbing
//!   anything above them
//!
//! Actions are plain data ([`CanvasAction`]); the presentation layer applies
//! them through the [`CanvasSurface`] seam. One reconciler instance holds the
//! object state for one consumer session and starts empty.

mod action;
mod ids;
mod layout;
mod reconciler;
mod surface;

pub use action::{CanvasAction, DiagramObject};
pub use ids::DiagramIds;
pub use layout::LayoutConfig;
pub use reconciler::Reconciler;
pub use surface::{CanvasSurface, RecordingSurface};
