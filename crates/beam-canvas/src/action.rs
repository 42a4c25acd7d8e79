//! Reconciliation side effects as plain data.

use crate::ids::DiagramIds;

/// Full description of one managed diagram on the canvas: the frame, the
/// backing image asset, and the image shape positioned inside the frame at
/// the padding offset.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramObject {
    /// Diagram index the object is keyed by.
    pub index: usize,
    /// Derived identifier triple.
    pub ids: DiagramIds,
    /// Frame name shown to the user.
    pub label: String,
    /// Image source data URL.
    pub src: String,
    /// Frame position.
    pub x: f64,
    /// Frame position.
    pub y: f64,
    /// Frame dimensions (image plus padding).
    pub frame_width: f64,
    /// Frame dimensions (image plus padding).
    pub frame_height: f64,
    /// Image dimensions.
    pub image_width: f64,
    /// Image dimensions.
    pub image_height: f64,
    /// Image offset inside the frame (the padding).
    pub image_offset: f64,
}

/// One reconciliation side effect.
///
/// Within a cycle, `Delete` actions always come after `Create`/`Update`
/// actions so a slot is never visibly torn down and rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// Create the frame, asset and image for a new diagram.
    Create(DiagramObject),
    /// Update an existing diagram in place: resize frame and image, replace
    /// the asset source, reposition the frame.
    Update(DiagramObject),
    /// Delete the identifier triple of a diagram no longer present.
    Delete { index: usize, ids: DiagramIds },
    /// Adjust the view to frame all managed objects.
    ZoomToFit,
}
