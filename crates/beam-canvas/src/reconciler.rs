//! The reconciliation algorithm.
//!
//! Compares the incoming diagram list against the object set from the
//! previous cycle and emits only the actions whose effect would actually
//! change the canvas. Layout order is strictly the incoming list's order,
//! never insertion time, which makes reconciliation idempotent: the same
//! list twice in a row produces no actions and no position drift.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use beam_diagrams::RenderedDiagram;

use crate::action::{CanvasAction, DiagramObject};
use crate::ids::DiagramIds;
use crate::layout::LayoutConfig;

/// What the reconciler remembers about one placed diagram.
#[derive(Debug, Clone, PartialEq)]
struct ObjectRecord {
    label: String,
    content_hash: String,
    width: f64,
    height: f64,
    y: f64,
}

/// Per-session reconciler.
///
/// Owns the canvas object set for one connected consumer. Starts empty;
/// canvas state is rebuilt from the document on every reconnect.
#[derive(Debug, Default)]
pub struct Reconciler {
    layout: LayoutConfig,
    objects: BTreeMap<usize, ObjectRecord>,
    fitted: bool,
}

impl Reconciler {
    /// Create a reconciler with the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(LayoutConfig::default())
    }

    /// Create a reconciler with an explicit layout.
    #[must_use]
    pub fn with_layout(layout: LayoutConfig) -> Self {
        Self {
            layout,
            objects: BTreeMap::new(),
            fitted: false,
        }
    }

    /// Indices currently placed on the canvas, in order.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.objects.keys().copied().collect()
    }

    /// Reconcile the canvas against a new diagram list.
    ///
    /// Emits creates and in-place updates in list order, then deletes for
    /// every managed index absent from the list, then a one-time zoom-to-fit
    /// on the session's first reconciliation that places anything.
    pub fn reconcile(&mut self, diagrams: &[RenderedDiagram]) -> Vec<CanvasAction> {
        let mut actions = Vec::new();
        let mut next: BTreeMap<usize, ObjectRecord> = BTreeMap::new();
        let mut cursor_y = self.layout.origin_y;

        for diagram in diagrams {
            if !has_usable_dimensions(diagram) {
                tracing::warn!(
                    index = diagram.index,
                    label = %diagram.label,
                    "diagram has no usable dimensions, treating as absent this cycle"
                );
                continue;
            }

            let (frame_width, frame_height) =
                self.layout.frame_size(diagram.width, diagram.height);
            let record = ObjectRecord {
                label: diagram.label.clone(),
                content_hash: content_hash(&diagram.data_url),
                width: diagram.width,
                height: diagram.height,
                y: cursor_y,
            };

            match self.objects.get(&diagram.index) {
                Some(previous) if *previous == record => {}
                Some(_) => actions.push(CanvasAction::Update(self.object(
                    diagram,
                    cursor_y,
                    frame_width,
                    frame_height,
                ))),
                None => actions.push(CanvasAction::Create(self.object(
                    diagram,
                    cursor_y,
                    frame_width,
                    frame_height,
                ))),
            }

            next.insert(diagram.index, record);
            cursor_y += frame_height + self.layout.frame_gap;
        }

        // Deletes go after creates/updates so a surviving slot never
        // flickers through a teardown.
        for &index in self.objects.keys() {
            if !next.contains_key(&index) {
                actions.push(CanvasAction::Delete {
                    index,
                    ids: DiagramIds::for_index(index),
                });
            }
        }

        self.objects = next;

        if !self.fitted && !self.objects.is_empty() {
            actions.push(CanvasAction::ZoomToFit);
            self.fitted = true;
        }

        actions
    }

    fn object(
        &self,
        diagram: &RenderedDiagram,
        y: f64,
        frame_width: f64,
        frame_height: f64,
    ) -> DiagramObject {
        DiagramObject {
            index: diagram.index,
            ids: DiagramIds::for_index(diagram.index),
            label: diagram.label.clone(),
            src: diagram.data_url.clone(),
            x: self.layout.origin_x,
            y,
            frame_width,
            frame_height,
            image_width: diagram.width,
            image_height: diagram.height,
            image_offset: self.layout.frame_padding,
        }
    }
}

fn has_usable_dimensions(diagram: &RenderedDiagram) -> bool {
    diagram.width.is_finite()
        && diagram.height.is_finite()
        && diagram.width > 0.0
        && diagram.height > 0.0
}

/// Content hash of the image data, for cheap change comparison.
fn content_hash(data_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data_url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diagram(index: usize, src: &str, width: f64, height: f64) -> RenderedDiagram {
        RenderedDiagram {
            index,
            label: format!("D{index}"),
            data_url: format!("data:image/svg+xml;base64,{src}"),
            width,
            height,
        }
    }

    fn three_diagrams() -> Vec<RenderedDiagram> {
        vec![
            diagram(0, "aaa", 200.0, 100.0),
            diagram(1, "bbb", 300.0, 150.0),
            diagram(2, "ccc", 250.0, 120.0),
        ]
    }

    fn creates(actions: &[CanvasAction]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, CanvasAction::Create(_)))
            .count()
    }

    fn updates(actions: &[CanvasAction]) -> Vec<usize> {
        actions
            .iter()
            .filter_map(|a| match a {
                CanvasAction::Update(object) => Some(object.index),
                _ => None,
            })
            .collect()
    }

    fn deletes(actions: &[CanvasAction]) -> Vec<usize> {
        actions
            .iter()
            .filter_map(|a| match a {
                CanvasAction::Delete { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_cycle_creates_everything_and_zooms() {
        let mut reconciler = Reconciler::new();
        let actions = reconciler.reconcile(&three_diagrams());

        assert_eq!(creates(&actions), 3);
        assert_eq!(updates(&actions), Vec::<usize>::new());
        assert_eq!(deletes(&actions), Vec::<usize>::new());
        assert_eq!(actions.last(), Some(&CanvasAction::ZoomToFit));
    }

    #[test]
    fn test_layout_stacks_bands_in_list_order() {
        let mut reconciler = Reconciler::new();
        let actions = reconciler.reconcile(&three_diagrams());

        let CanvasAction::Create(first) = &actions[0] else {
            panic!("expected create");
        };
        let CanvasAction::Create(second) = &actions[1] else {
            panic!("expected create");
        };

        // origin (100, 100), frame = image + 2*20 padding, gap 40
        assert_eq!((first.x, first.y), (100.0, 100.0));
        assert_eq!(first.frame_width, 240.0);
        assert_eq!(first.frame_height, 140.0);
        assert_eq!(first.image_offset, 20.0);
        assert_eq!(second.y, 100.0 + 140.0 + 40.0);
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let mut reconciler = Reconciler::new();
        let diagrams = three_diagrams();

        let first = reconciler.reconcile(&diagrams);
        assert!(!first.is_empty());

        let second = reconciler.reconcile(&diagrams);
        assert_eq!(second, Vec::new());
        assert_eq!(reconciler.active_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_content_change_updates_exactly_one_object() {
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&three_diagrams());

        let mut changed = three_diagrams();
        changed[2].data_url = "data:image/svg+xml;base64,changed".to_owned();
        let actions = reconciler.reconcile(&changed);

        assert_eq!(creates(&actions), 0);
        assert_eq!(updates(&actions), vec![2]);
        assert_eq!(deletes(&actions), Vec::<usize>::new());
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_height_change_reflows_only_bands_below() {
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&three_diagrams());

        let mut changed = three_diagrams();
        changed[1].height = 250.0; // was 150
        let actions = reconciler.reconcile(&changed);

        // index 0 untouched, index 1 resized in place, index 2 pushed down
        assert_eq!(updates(&actions), vec![1, 2]);
        assert_eq!(creates(&actions), 0);
        assert_eq!(deletes(&actions), Vec::<usize>::new());

        let CanvasAction::Update(third) = &actions[1] else {
            panic!("expected update");
        };
        // band 0: 100 + (100+40) + 40 = 280; band 1 now 250+40 tall + 40 gap
        assert_eq!(third.index, 2);
        assert_eq!(third.y, 280.0 + 290.0 + 40.0);
    }

    #[test]
    fn test_omitted_index_deletes_exactly_that_triple() {
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&three_diagrams());

        let mut remaining = three_diagrams();
        remaining.remove(1);
        let actions = reconciler.reconcile(&remaining);

        assert_eq!(deletes(&actions), vec![1]);
        let deleted_ids = actions.iter().find_map(|a| match a {
            CanvasAction::Delete { ids, .. } => Some(ids.clone()),
            _ => None,
        });
        assert_eq!(deleted_ids, Some(DiagramIds::for_index(1)));

        // removing the middle band reflows the one below it
        assert_eq!(updates(&actions), vec![2]);
        assert_eq!(reconciler.active_indices(), vec![0, 2]);
    }

    #[test]
    fn test_deletes_come_after_creates_and_updates() {
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&three_diagrams());

        // drop index 0, change index 1: both an update and a delete this cycle
        let mut changed = three_diagrams();
        changed.remove(0);
        changed[0].data_url = "data:image/svg+xml;base64,new".to_owned();
        let actions = reconciler.reconcile(&changed);

        let first_delete = actions
            .iter()
            .position(|a| matches!(a, CanvasAction::Delete { .. }))
            .expect("delete action");
        let last_update = actions
            .iter()
            .rposition(|a| matches!(a, CanvasAction::Update(_) | CanvasAction::Create(_)))
            .expect("update action");
        assert!(last_update < first_delete);
    }

    #[test]
    fn test_empty_list_deletes_all_managed_objects() {
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&three_diagrams());

        let actions = reconciler.reconcile(&[]);

        assert_eq!(creates(&actions), 0);
        assert_eq!(updates(&actions), Vec::<usize>::new());
        assert_eq!(deletes(&actions), vec![0, 1, 2]);
        assert_eq!(reconciler.active_indices(), Vec::<usize>::new());
    }

    #[test]
    fn test_zoom_to_fit_only_on_first_placing_cycle() {
        let mut reconciler = Reconciler::new();

        // an empty first cycle places nothing and does not zoom
        assert_eq!(reconciler.reconcile(&[]), Vec::new());

        let first = reconciler.reconcile(&three_diagrams());
        assert_eq!(first.last(), Some(&CanvasAction::ZoomToFit));

        let mut changed = three_diagrams();
        changed[0].data_url = "data:image/svg+xml;base64,new".to_owned();
        let second = reconciler.reconcile(&changed);
        assert!(!second.contains(&CanvasAction::ZoomToFit));
    }

    #[test]
    fn test_unusable_dimensions_treated_as_absent() {
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&three_diagrams());

        let mut changed = three_diagrams();
        changed[1].width = 0.0;
        let actions = reconciler.reconcile(&changed);

        // index 1 is gone this cycle, index 2 reflows upward
        assert_eq!(deletes(&actions), vec![1]);
        assert_eq!(updates(&actions), vec![2]);
        assert_eq!(reconciler.active_indices(), vec![0, 2]);
    }

    #[test]
    fn test_gapped_indices_lay_out_contiguously() {
        let mut reconciler = Reconciler::new();
        // pipeline output may skip failed blocks, leaving index gaps
        let diagrams = vec![diagram(0, "aaa", 200.0, 100.0), diagram(2, "ccc", 250.0, 120.0)];
        let actions = reconciler.reconcile(&diagrams);

        let CanvasAction::Create(second) = &actions[1] else {
            panic!("expected create");
        };
        assert_eq!(second.index, 2);
        // stacked directly below band 0 despite the index gap
        assert_eq!(second.y, 100.0 + 140.0 + 40.0);
    }
}
