//! End-to-end reconciliation over a surface: a document evolving across
//! three cycles, applied through the `CanvasSurface` seam.

use pretty_assertions::assert_eq;

use beam_canvas::{CanvasAction, CanvasSurface, RecordingSurface, Reconciler};
use beam_diagrams::RenderedDiagram;

fn diagram(index: usize, src: &str, height: f64) -> RenderedDiagram {
    RenderedDiagram {
        index,
        label: format!("D{index}"),
        data_url: format!("data:image/svg+xml;base64,{src}"),
        width: 200.0,
        height,
    }
}

#[test]
fn test_session_converges_across_cycles() {
    let mut reconciler = Reconciler::new();
    let mut surface = RecordingSurface::new();

    // Cycle 1: fresh session, two diagrams.
    let actions = reconciler.reconcile(&[diagram(0, "a", 100.0), diagram(1, "b", 100.0)]);
    surface.apply_all(&actions);
    assert_eq!(
        surface
            .applied
            .iter()
            .filter(|a| matches!(a, CanvasAction::Create(_)))
            .count(),
        2
    );
    assert!(surface.applied.contains(&CanvasAction::ZoomToFit));

    // Cycle 2: first diagram edited, second unchanged.
    surface.applied.clear();
    let actions = reconciler.reconcile(&[diagram(0, "a2", 100.0), diagram(1, "b", 100.0)]);
    surface.apply_all(&actions);
    let updated: Vec<usize> = surface
        .applied
        .iter()
        .filter_map(|a| match a {
            CanvasAction::Update(object) => Some(object.index),
            _ => None,
        })
        .collect();
    assert_eq!(updated, vec![0]);
    assert_eq!(surface.applied.len(), 1);

    // Cycle 3: the document shrinks to a single new diagram.
    surface.applied.clear();
    let actions = reconciler.reconcile(&[diagram(0, "a2", 100.0)]);
    surface.apply_all(&actions);
    let deleted: Vec<usize> = surface
        .applied
        .iter()
        .filter_map(|a| match a {
            CanvasAction::Delete { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(deleted, vec![1]);
    assert_eq!(reconciler.active_indices(), vec![0]);
}
