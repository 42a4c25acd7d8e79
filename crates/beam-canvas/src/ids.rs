//! Deterministic canvas identifiers.
//!
//! Every diagram index maps to the same frame/shape/asset identifier triple
//! on every cycle. That stability is what makes in-place updates possible
//! instead of teardown and rebuild, and it makes the managed namespace
//! decidable from an identifier alone: user-drawn content never collides
//! with it.

const FRAME_PREFIX: &str = "diagram-frame-";
const SHAPE_PREFIX: &str = "diagram-shape-";
const ASSET_PREFIX: &str = "diagram-asset-";

/// The identifier triple backing one managed diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramIds {
    /// Frame around the image.
    pub frame_id: String,
    /// Image shape inside the frame.
    pub shape_id: String,
    /// Asset holding the image data.
    pub asset_id: String,
}

impl DiagramIds {
    /// Derive the identifier triple for a diagram index.
    ///
    /// Pure: the same index always yields the same identifiers.
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        Self {
            frame_id: format!("{FRAME_PREFIX}{index}"),
            shape_id: format!("{SHAPE_PREFIX}{index}"),
            asset_id: format!("{ASSET_PREFIX}{index}"),
        }
    }

    /// Whether an identifier belongs to the managed namespace.
    ///
    /// Objects outside it (user-drawn content) must never be touched.
    #[must_use]
    pub fn is_managed(id: &str) -> bool {
        id.starts_with(FRAME_PREFIX) || id.starts_with(SHAPE_PREFIX) || id.starts_with(ASSET_PREFIX)
    }
}
