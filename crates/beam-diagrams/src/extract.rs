//! Mermaid block extraction from markdown documents.
//!
//! Scans a document for ` ```mermaid ` fenced code blocks and pairs each with
//! a label derived from the heading immediately above it (blank lines in
//! between are fine, any other content is not).

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;

/// Short label prefix at the start of a heading: a run of uppercase letters,
/// a run of digits, or the literal `CURRENT`, terminated by `:`, `.` or the
/// end of the heading. Headings like "A: Shape Name" label the diagram "A";
/// headings without such a prefix label it with their full text.
static LABEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+|[0-9]+|CURRENT)(?:[:.]|$)").unwrap());

/// One mermaid block extracted from a document.
///
/// `index` is the block's position of occurrence, starting at 0. A document
/// re-parse always regenerates the full list from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Display label derived from the preceding heading, or "Diagram N".
    pub label: String,
    /// Inner fence content, trimmed of surrounding whitespace.
    pub source: String,
    /// Zero-based position among all extracted blocks.
    pub index: usize,
}

/// Extract all mermaid blocks from a markdown document, in document order.
///
/// A heading (`#` to `###`) counts as the block's label source only when no
/// other block-level content sits between it and the fence. Unclosed fences
/// are not matched. A document with no mermaid blocks yields an empty vec.
#[must_use]
pub fn extract(markdown: &str) -> Vec<DiagramBlock> {
    let mut blocks: Vec<DiagramBlock> = Vec::new();

    // Heading text waiting for a fence to claim it.
    let mut pending_heading: Option<String> = None;
    // Heading currently being collected (H1-H3 only).
    let mut heading: Option<String> = None;
    // Mermaid fence currently being collected, with its source range.
    let mut mermaid: Option<(String, Range<usize>)> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. }
                    if matches!(
                        level,
                        HeadingLevel::H1 | HeadingLevel::H2 | HeadingLevel::H3
                    ) =>
                {
                    heading = Some(String::new());
                }
                Tag::CodeBlock(CodeBlockKind::Fenced(ref info))
                    if fence_language(info) == Some("mermaid") =>
                {
                    mermaid = Some((String::new(), range));
                }
                // Inline containers keep whatever heading is pending.
                Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. }
                | Tag::Image { .. } => {}
                // Any other block-level content breaks heading adjacency.
                _ => {
                    if heading.is_none() && mermaid.is_none() {
                        pending_heading = None;
                    }
                }
            },
            Event::End(TagEnd::Heading(_)) => {
                if let Some(text) = heading.take() {
                    pending_heading = Some(text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((source, span)) = mermaid.take() {
                    let region = &markdown[span.start..span.end];
                    if fence_is_closed(region) {
                        let index = blocks.len();
                        let label = derive_label(pending_heading.take().as_deref(), index);
                        blocks.push(DiagramBlock {
                            label,
                            source: source.trim().to_owned(),
                            index,
                        });
                    } else {
                        tracing::debug!(offset = span.start, "ignoring unclosed mermaid fence");
                        pending_heading = None;
                    }
                }
            }
            Event::Text(text) => {
                if let Some((source, _)) = mermaid.as_mut() {
                    source.push_str(&text);
                } else if let Some(buf) = heading.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::Code(text) => {
                if let Some(buf) = heading.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(buf) = heading.as_mut() {
                    buf.push(' ');
                }
            }
            Event::Rule => {
                pending_heading = None;
            }
            _ => {}
        }
    }

    blocks
}

/// First token of a fence info string, e.g. `mermaid` for ` ```mermaid `.
fn fence_language<'a>(info: &'a CowStr<'_>) -> Option<&'a str> {
    info.split_whitespace().next()
}

/// Whether a fenced region carries its closing fence.
///
/// The parser extends an unclosed fence to the end of the document; such
/// regions are rejected. The closing fence is a line consisting of at least
/// as many fence characters as the opening run.
fn fence_is_closed(region: &str) -> bool {
    let mut lines = region.trim_end().lines();
    let Some(first) = lines.next() else {
        return false;
    };

    let opening = first.trim_start();
    let fence_char = match opening.chars().next() {
        Some(c @ ('`' | '~')) => c,
        _ => return false,
    };
    let open_len = opening.chars().take_while(|&c| c == fence_char).count();

    let Some(last) = lines.last() else {
        return false;
    };
    let last = last.trim();
    last.len() >= open_len && last.chars().all(|c| c == fence_char)
}

/// Derive the display label for a block.
///
/// `position` is the block's zero-based position among all blocks; unlabeled
/// blocks become "Diagram N" with N counted over that position.
fn derive_label(heading: Option<&str>, position: usize) -> String {
    match heading {
        Some(heading) => {
            let heading = heading.trim();
            LABEL_PREFIX
                .captures(heading)
                .map_or_else(|| heading.to_owned(), |caps| caps[1].to_owned())
        }
        None => format!("Diagram {}", position + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(markdown: &str) -> Vec<String> {
        extract(markdown).into_iter().map(|b| b.label).collect()
    }

    #[test]
    fn test_empty_document_yields_no_blocks() {
        assert_eq!(extract(""), Vec::new());
        assert_eq!(extract("# Title\n\nJust prose.\n"), Vec::new());
    }

    #[test]
    fn test_indices_are_strictly_increasing_from_zero() {
        let markdown = "\
```mermaid
graph TD
```

```mermaid
graph LR
```

```mermaid
sequenceDiagram
```
";
        let blocks = extract(markdown);
        let indices: Vec<usize> = blocks.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_label_from_short_uppercase_prefix() {
        let markdown = "## A: Shape Name\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["A"]);
    }

    #[test]
    fn test_label_from_numeric_prefix() {
        let markdown = "### 12. Something\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["12"]);
    }

    #[test]
    fn test_label_from_current_marker() {
        let markdown = "## CURRENT: Live View\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["CURRENT"]);
    }

    #[test]
    fn test_label_falls_back_to_full_heading_text() {
        let markdown = "## Just A Title\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["Just A Title"]);
    }

    #[test]
    fn test_unlabeled_blocks_are_numbered_over_all_blocks() {
        let markdown = "\
## A: First

```mermaid
graph TD
```

```mermaid
graph LR
```
";
        assert_eq!(labels(markdown), vec!["A", "Diagram 2"]);
    }

    #[test]
    fn test_first_unlabeled_block_is_diagram_one() {
        let markdown = "```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["Diagram 1"]);
    }

    #[test]
    fn test_blank_lines_between_heading_and_fence_are_allowed() {
        let markdown = "## B: Spaced\n\n\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["B"]);
    }

    #[test]
    fn test_intervening_paragraph_breaks_heading_adjacency() {
        let markdown = "\
## C: Not Mine

Some prose in between.

```mermaid
graph TD
```
";
        assert_eq!(labels(markdown), vec!["Diagram 1"]);
    }

    #[test]
    fn test_intervening_code_block_breaks_heading_adjacency() {
        let markdown = "\
## D: Not Mine

```rust
fn main() {}
```

```mermaid
graph TD
```
";
        assert_eq!(labels(markdown), vec!["Diagram 1"]);
    }

    #[test]
    fn test_deep_heading_does_not_label() {
        let markdown = "#### E: Too Deep\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["Diagram 1"]);
    }

    #[test]
    fn test_source_is_trimmed_inner_content() {
        let markdown = "```mermaid\n\ngraph TD\n  A --> B\n\n```\n";
        let blocks = extract(markdown);
        assert_eq!(blocks[0].source, "graph TD\n  A --> B");
    }

    #[test]
    fn test_non_mermaid_fences_are_ignored() {
        let markdown = "```python\nprint('hi')\n```\n\n```mermaid\ngraph TD\n```\n";
        let blocks = extract(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source, "graph TD");
    }

    #[test]
    fn test_unclosed_fence_is_not_matched() {
        let markdown = "## F: Dangling\n\n```mermaid\ngraph TD\n  A --> B\n";
        assert_eq!(extract(markdown), Vec::new());
    }

    #[test]
    fn test_heading_with_inline_code_uses_combined_text() {
        let markdown = "## The `core` flow\n\n```mermaid\ngraph TD\n```\n";
        assert_eq!(labels(markdown), vec!["The core flow"]);
    }

    #[test]
    fn test_derive_label_prefix_rules() {
        assert_eq!(derive_label(Some("A: Shape Name"), 0), "A");
        assert_eq!(derive_label(Some("12. Something"), 0), "12");
        assert_eq!(derive_label(Some("CURRENT: Live View"), 0), "CURRENT");
        assert_eq!(derive_label(Some("Just A Title"), 0), "Just A Title");
        assert_eq!(derive_label(Some("  padded  "), 0), "padded");
        assert_eq!(derive_label(Some("AB"), 0), "AB");
        assert_eq!(derive_label(None, 0), "Diagram 1");
        assert_eq!(derive_label(None, 3), "Diagram 4");
    }

    #[test]
    fn test_fence_is_closed() {
        assert!(fence_is_closed("```mermaid\ngraph TD\n```"));
        assert!(fence_is_closed("````mermaid\ngraph TD\n````\n"));
        assert!(!fence_is_closed("```mermaid\ngraph TD\n"));
        assert!(!fence_is_closed("```mermaid"));
    }
}
