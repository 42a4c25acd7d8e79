//! Mermaid block extraction and rendering for beam.
//!
//! This crate turns a markdown document into an ordered list of rendered
//! diagrams:
//! - [`extract`]: fenced ` ```mermaid ` blocks with labels derived from the
//!   preceding heading
//! - [`DiagramRenderer`]: uniform contract over the actual rendering backend,
//!   with two implementations ([`MmdcRenderer`] via the mermaid CLI,
//!   [`KrokiRenderer`] via a Kroki service)
//! - [`RenderPipeline`]: drives extraction and parallel rendering for a whole
//!   document, isolating per-block failures
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use beam_diagrams::{MmdcRenderer, RenderPipeline};
//!
//! let renderer = Arc::new(MmdcRenderer::new("mmdc"));
//! let pipeline = RenderPipeline::new(renderer);
//! let diagrams = pipeline.process_document("doc.md".as_ref())?;
//! ```

mod cache;
mod extract;
mod kroki;
mod mmdc;
mod pipeline;
mod renderer;
mod svg;

pub use extract::{DiagramBlock, extract};
pub use kroki::KrokiRenderer;
pub use mmdc::MmdcRenderer;
pub use pipeline::{PipelineError, RenderPipeline, RenderedDiagram};
pub use renderer::{DiagramRenderer, RenderError, RenderedSvg};
pub use svg::{resolve_svg_dimensions, svg_base64, svg_data_url};
