//! SVG helpers: pixel dimension resolution and data-URL encoding.

use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;

/// Root `<svg ...>` tag.
static SVG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg[^>]*>").unwrap());

/// `width="…"` attribute with a plain or px-suffixed numeric value.
/// Percentage widths (mermaid emits `width="100%"`) deliberately do not match.
static WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bwidth="([0-9]+(?:\.[0-9]+)?)(?:px)?""#).unwrap());

/// `height="…"` attribute with a plain or px-suffixed numeric value.
static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bheight="([0-9]+(?:\.[0-9]+)?)(?:px)?""#).unwrap());

/// `viewBox="min-x min-y width height"`.
static VIEWBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bviewBox="\s*-?[0-9.]+[\s,]+-?[0-9.]+[\s,]+([0-9]+(?:\.[0-9]+)?)[\s,]+([0-9]+(?:\.[0-9]+)?)\s*""#,
    )
    .unwrap()
});

/// Resolve the pixel dimensions of an SVG document.
///
/// Reads `width`/`height` from the root tag, falling back to the `viewBox`
/// when they are absent or non-numeric (mermaid emits `width="100%"` plus a
/// viewBox). Returns `None` when no positive dimensions can be determined.
#[must_use]
pub fn resolve_svg_dimensions(svg: &str) -> Option<(f64, f64)> {
    let tag = SVG_TAG_RE.find(svg)?.as_str();

    let width = WIDTH_RE
        .captures(tag)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    let height = HEIGHT_RE
        .captures(tag)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            let caps = VIEWBOX_RE.captures(tag)?;
            let w = caps[1].parse::<f64>().ok()?;
            let h = caps[2].parse::<f64>().ok()?;
            (w, h)
        }
    };

    (width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite())
        .then_some((width, height))
}

/// Base64-encode an SVG document.
#[must_use]
pub fn svg_base64(svg: &str) -> String {
    BASE64_STANDARD.encode(svg.as_bytes())
}

/// Encode an SVG document as a `data:image/svg+xml;base64,…` URL.
#[must_use]
pub fn svg_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", svg_base64(svg))
}
