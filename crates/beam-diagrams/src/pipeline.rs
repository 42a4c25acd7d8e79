//! Render pipeline: whole-document extraction and rendering.
//!
//! Drives [`extract`] and the configured [`DiagramRenderer`] for one
//! document, producing an ordered list of rendered diagrams. Per-block
//! failures are logged and skipped so one bad block does not abort the
//! batch; an unreadable document is a typed error so callers can tell
//! "nothing to broadcast" apart from "no diagrams in the file".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::cache::{CachedRender, RenderCache, RenderKey};
use crate::extract::{DiagramBlock, extract};
use crate::renderer::{DiagramRenderer, RenderError, RenderedSvg};
use crate::svg::{resolve_svg_dimensions, svg_data_url};

/// One diagram rendered from a document, with resolved pixel dimensions.
///
/// Recomputed wholesale on every render cycle, never mutated in place.
/// `index` values keep their extraction positions, so a list with failed
/// blocks has gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDiagram {
    /// Zero-based extraction index of the source block.
    pub index: usize,
    /// Display label of the source block.
    pub label: String,
    /// Rendered image as a `data:image/svg+xml;base64,…` URL.
    pub data_url: String,
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
}

/// Whole-cycle pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", path.display())]
    DocumentUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Drives extraction and rendering for whole documents.
pub struct RenderPipeline {
    renderer: Arc<dyn DiagramRenderer>,
    cache: RenderCache,
}

impl RenderPipeline {
    /// Create a pipeline over the given renderer.
    #[must_use]
    pub fn new(renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self {
            renderer,
            cache: RenderCache::new(),
        }
    }

    /// Read and render one document.
    ///
    /// Returns the ordered list of successfully rendered diagrams, which may
    /// be shorter than the block count. An unreadable document fails the
    /// whole operation.
    pub fn process_document(&self, path: &Path) -> Result<Vec<RenderedDiagram>, PipelineError> {
        let markdown =
            std::fs::read_to_string(path).map_err(|source| PipelineError::DocumentUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let blocks = extract(&markdown);
        tracing::info!(
            path = %path.display(),
            count = blocks.len(),
            "extracted mermaid blocks"
        );

        Ok(self.render_blocks(blocks))
    }

    /// Render a list of extracted blocks.
    ///
    /// Unchanged blocks are served from the content-hash cache; the rest are
    /// rendered in parallel on the rayon pool, then the combined list is
    /// re-sorted into document order.
    #[must_use]
    pub fn render_blocks(&self, blocks: Vec<DiagramBlock>) -> Vec<RenderedDiagram> {
        let mut rendered = Vec::with_capacity(blocks.len());
        let mut to_render = Vec::new();

        for block in blocks {
            let hash = RenderKey {
                source: &block.source,
            }
            .compute_hash();

            if let Some(hit) = self.cache.get(&hash) {
                rendered.push(RenderedDiagram {
                    index: block.index,
                    label: block.label,
                    data_url: hit.data_url,
                    width: hit.width,
                    height: hit.height,
                });
            } else {
                to_render.push((block, hash));
            }
        }

        let fresh: Vec<Option<RenderedDiagram>> = to_render
            .par_iter()
            .map(|(block, hash)| self.render_block(block, hash))
            .collect();
        rendered.extend(fresh.into_iter().flatten());

        // Renders complete in arbitrary order; emit in document order.
        rendered.sort_by_key(|d| d.index);
        rendered
    }

    /// Render one block, returning `None` on any per-block failure.
    fn render_block(&self, block: &DiagramBlock, hash: &str) -> Option<RenderedDiagram> {
        match self.renderer.render(&block.source) {
            Ok(RenderedSvg { svg }) => match resolve_svg_dimensions(&svg) {
                Some((width, height)) => {
                    let data_url = svg_data_url(&svg);
                    self.cache.insert(
                        hash.to_owned(),
                        CachedRender {
                            data_url: data_url.clone(),
                            width,
                            height,
                        },
                    );
                    Some(RenderedDiagram {
                        index: block.index,
                        label: block.label.clone(),
                        data_url,
                        width,
                        height,
                    })
                }
                None => {
                    tracing::warn!(
                        index = block.index,
                        label = %block.label,
                        "could not determine diagram dimensions, skipping block"
                    );
                    None
                }
            },
            Err(err) => {
                tracing::warn!(
                    index = block.index,
                    label = %block.label,
                    error = %err,
                    "diagram failed to render, skipping block"
                );
                None
            }
        }
    }

    /// Render ad-hoc source for an on-demand request, bypassing the cache.
    pub fn render_source(&self, source: &str) -> Result<RenderedSvg, RenderError> {
        self.renderer.render(source)
    }
}
