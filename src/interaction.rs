//! Hit testing and drag-to-reposition for a laid-out chart.
//!
//! A drag starts on a placed node, follows the pointer freely while it is
//! active and snaps the node onto the grid when it ends. Only the pixel
//! position changes; grid cells keep what the layout computed.

use tracing::debug;

use crate::ir::TaskId;
use crate::layout::{Canvas, GridGeometry, Placement, Rect};

/// An active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub id: TaskId,
    /// Pointer position relative to the node's top-left corner at grab time.
    pub grab_offset: (f32, f32),
    /// Where the node was when the drag started.
    pub origin: Rect,
    /// Where the node is drawn right now.
    pub rect: Rect,
    /// Last pointer position seen by the drag.
    pub pointer: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Result of a finished drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub id: TaskId,
    pub snapped: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            InteractionState::Dragging(session) => Some(session),
            InteractionState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session().is_some()
    }

    /// First placed node, in node list order, whose rectangle holds the point.
    pub fn hit_test(
        &self,
        placement: &Placement,
        geometry: &GridGeometry,
        x: f32,
        y: f32,
    ) -> Option<TaskId> {
        placement
            .ordered()
            .into_iter()
            .find(|node| geometry.rect_at(node.x, node.y).contains(x, y))
            .map(|node| node.id)
    }

    /// Starts dragging `id`. `pointer` is where the node was grabbed; without
    /// it the node's top-left corner follows the pointer. Ignored while another
    /// drag is active or when the node is not placed.
    pub fn begin_drag(
        &mut self,
        placement: &Placement,
        geometry: &GridGeometry,
        id: TaskId,
        pointer: Option<(f32, f32)>,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(rect) = placement.rect(id, geometry) else {
            return false;
        };
        let pointer = pointer.unwrap_or((rect.x, rect.y));
        let grab_offset = (pointer.0 - rect.x, pointer.1 - rect.y);
        debug!(task = %id, "drag started");
        self.state = InteractionState::Dragging(DragSession {
            id,
            grab_offset,
            origin: rect,
            rect,
            pointer,
        });
        true
    }

    /// Moves the dragged node under the pointer and grows `canvas` when the
    /// node gets close to its right or bottom edge.
    pub fn update_drag(
        &mut self,
        x: f32,
        y: f32,
        geometry: &GridGeometry,
        canvas: &mut Canvas,
    ) -> Option<Rect> {
        let InteractionState::Dragging(session) = &mut self.state else {
            return None;
        };
        session.rect.x = x - session.grab_offset.0;
        session.rect.y = y - session.grab_offset.1;
        session.pointer = (x, y);
        canvas.grow_to_fit(&session.rect, geometry);
        Some(session.rect)
    }

    /// Snaps the dragged node onto the grid, stores its new position and
    /// recomputes the canvas from all node positions. The column follows the
    /// node's center and the row follows the release point.
    pub fn end_drag(
        &mut self,
        placement: &mut Placement,
        geometry: &GridGeometry,
        canvas: &mut Canvas,
    ) -> Option<DragOutcome> {
        let InteractionState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        if placement.cell(session.id).is_none() {
            debug!(task = %session.id, "dragged task is gone, dropping the drag");
            return None;
        }
        let snapped = geometry.snap_drop(&session.rect, session.pointer);
        placement.set_position(session.id, snapped.x, snapped.y);
        *canvas = Canvas::fit(placement, geometry);
        debug!(task = %session.id, x = snapped.x, y = snapped.y, "drag committed");
        Some(DragOutcome {
            id: session.id,
            snapped,
        })
    }

    /// Abandons the active drag, leaving the node where it was.
    pub fn cancel_drag(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging(session) => Some(session),
            InteractionState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn setup() -> (Placement, GridGeometry, Canvas) {
        let geometry = GridGeometry::from_config(&LayoutConfig::default());
        let mut placement = Placement::new();
        placement.add(TaskId(1), 0);
        placement.add(TaskId(2), 1);
        placement.apply_geometry(&geometry);
        let canvas = Canvas::fit(&placement, &geometry);
        (placement, geometry, canvas)
    }

    #[test]
    fn hit_test_uses_half_open_rects() {
        let (placement, geometry, _) = setup();
        let ctl = InteractionController::new();
        assert_eq!(ctl.hit_test(&placement, &geometry, 5.0, 5.0), Some(TaskId(1)));
        assert_eq!(ctl.hit_test(&placement, &geometry, 114.9, 74.9), Some(TaskId(1)));
        assert_eq!(ctl.hit_test(&placement, &geometry, 115.0, 40.0), None);
        assert_eq!(ctl.hit_test(&placement, &geometry, 150.0, 40.0), Some(TaskId(2)));
        assert_eq!(ctl.hit_test(&placement, &geometry, 0.0, 0.0), None);
    }

    #[test]
    fn drag_snaps_column_by_center_and_row_by_pointer() {
        let (mut placement, geometry, mut canvas) = setup();
        let mut ctl = InteractionController::new();
        assert!(ctl.begin_drag(&placement, &geometry, TaskId(1), Some((20.0, 20.0))));
        assert!(!ctl.begin_drag(&placement, &geometry, TaskId(2), None));
        let rect = ctl.update_drag(300.0, 110.0, &geometry, &mut canvas).unwrap();
        assert_eq!((rect.x, rect.y), (285.0, 95.0));
        // Canvas grew to keep the dragged node in view.
        assert_eq!(canvas.width, 285.0 + 110.0 + 30.0);
        assert_eq!(canvas.height, 95.0 + 70.0 + 15.0);

        let outcome = ctl.end_drag(&mut placement, &geometry, &mut canvas).unwrap();
        assert_eq!(outcome.id, TaskId(1));
        assert_eq!((outcome.snapped.x, outcome.snapped.y), (285.0, 90.0));
        assert!(!ctl.is_dragging());
        assert_eq!(placement.cell(TaskId(1)), Some(crate::layout::GridCell::new(0, 0)));
        assert_eq!(canvas.height, 90.0 + 70.0 + 15.0);
    }

    #[test]
    fn drop_row_follows_the_pointer_not_the_box() {
        let (mut placement, geometry, mut canvas) = setup();
        let mut ctl = InteractionController::new();
        // Grabbed near the bottom edge, so the box sits 65px above the pointer.
        assert!(ctl.begin_drag(&placement, &geometry, TaskId(1), Some((20.0, 70.0))));
        let rect = ctl.update_drag(20.0, 100.0, &geometry, &mut canvas).unwrap();
        assert_eq!((rect.x, rect.y), (5.0, 35.0));
        assert_eq!(ctl.session().map(|s| s.pointer), Some((20.0, 100.0)));

        let outcome = ctl.end_drag(&mut placement, &geometry, &mut canvas).unwrap();
        // The box center (60, 70) is still in the first row, the pointer is not.
        assert_eq!((outcome.snapped.x, outcome.snapped.y), (5.0, 90.0));
        assert_eq!(placement.get(TaskId(1)).map(|n| (n.x, n.y)), Some((5.0, 90.0)));
    }

    #[test]
    fn cancel_and_idle_operations_are_no_ops() {
        let (mut placement, geometry, mut canvas) = setup();
        let mut ctl = InteractionController::new();
        assert!(ctl.update_drag(1.0, 1.0, &geometry, &mut canvas).is_none());
        assert!(ctl.end_drag(&mut placement, &geometry, &mut canvas).is_none());
        assert!(!ctl.begin_drag(&placement, &geometry, TaskId(9), None));

        ctl.begin_drag(&placement, &geometry, TaskId(2), None);
        ctl.update_drag(600.0, 600.0, &geometry, &mut canvas);
        let session = ctl.cancel_drag().unwrap();
        assert_eq!(session.origin.x, 145.0);
        assert_eq!(placement.get(TaskId(2)).map(|n| n.x), Some(145.0));
        assert_eq!(*ctl.state(), InteractionState::Idle);
    }
}
