use std::borrow::Cow;

use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::interaction::{DragOutcome, InteractionController, InteractionState};
use crate::ir::{TaskGraphProvider, TaskId};
use crate::layout::{
    Canvas, GridGeometry, LayoutError, PertLayout, Placement, Rect, build_layout,
    compute_placement, fallback_placement,
};
use crate::model::GraphModel;

/// A PERT chart: the graph model, its placement, the canvas and the drag state.
///
/// `rebuild` recomputes everything from the task provider; `refresh` only
/// updates node text and colors.
#[derive(Debug, Clone)]
pub struct PertChart {
    config: LayoutConfig,
    geometry: GridGeometry,
    model: GraphModel,
    placement: Placement,
    canvas: Canvas,
    interaction: InteractionController,
    failure: Option<LayoutError>,
}

impl PertChart {
    pub fn new(config: LayoutConfig) -> Self {
        let geometry = GridGeometry::from_config(&config);
        let placement = Placement::new();
        let canvas = Canvas::fit(&placement, &geometry);
        Self {
            config,
            geometry,
            model: GraphModel::default(),
            placement,
            canvas,
            interaction: InteractionController::new(),
            failure: None,
        }
    }

    /// Rebuilds the model and recomputes the layout, discarding manual
    /// positions and any active drag. When the layout fails every node is
    /// listed in a single column and the error is returned.
    pub fn rebuild<P: TaskGraphProvider + ?Sized>(&mut self, provider: &P) -> Result<(), LayoutError> {
        if let Some(session) = self.interaction.cancel_drag() {
            debug!(task = %session.id, "rebuild cancelled an active drag");
        }
        self.model = GraphModel::from_provider(provider);
        let result = match compute_placement(&self.model, &self.config) {
            Ok(placement) => {
                self.placement = placement;
                self.failure = None;
                info!(
                    nodes = self.placement.len(),
                    columns = self.placement.columns(),
                    "chart rebuilt"
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "layout failed, listing tasks in one column");
                self.placement = fallback_placement(&self.model, &self.geometry);
                self.failure = Some(err.clone());
                Err(err)
            }
        };
        self.canvas = Canvas::fit(&self.placement, &self.geometry);
        result
    }

    /// Pulls fresh attributes for the tasks already on the chart. Topology,
    /// placement and manual positions stay untouched. Returns how many nodes
    /// were updated.
    pub fn refresh<P: TaskGraphProvider + ?Sized>(&mut self, provider: &P) -> usize {
        let fresh = GraphModel::from_provider(provider);
        let updated = self.model.refresh_attributes(&fresh);
        debug!(updated, "chart refreshed");
        updated
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// The error of the last rebuild when the fallback list is shown.
    pub fn last_failure(&self) -> Option<&LayoutError> {
        self.failure.as_ref()
    }

    pub fn interaction_state(&self) -> &InteractionState {
        self.interaction.state()
    }

    /// Drawable layout. An active drag shows the node at its draft position
    /// with its edges following it.
    pub fn layout(&self) -> PertLayout {
        let placement = match self.interaction.session() {
            Some(session) => {
                let mut draft = self.placement.clone();
                draft.set_position(session.id, session.rect.x, session.rect.y);
                Cow::Owned(draft)
            }
            None => Cow::Borrowed(&self.placement),
        };
        let mut layout = build_layout(&self.model, &placement, &self.config);
        layout.width = self.canvas.width;
        layout.height = self.canvas.height;
        layout
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<TaskId> {
        self.interaction.hit_test(&self.placement, &self.geometry, x, y)
    }

    pub fn begin_drag(&mut self, id: TaskId) -> bool {
        self.interaction
            .begin_drag(&self.placement, &self.geometry, id, None)
    }

    /// Starts a drag on whatever node is under the pointer.
    pub fn begin_drag_at(&mut self, x: f32, y: f32) -> Option<TaskId> {
        let id = self.hit_test(x, y)?;
        self.interaction
            .begin_drag(&self.placement, &self.geometry, id, Some((x, y)))
            .then_some(id)
    }

    pub fn update_drag(&mut self, x: f32, y: f32) -> Option<Rect> {
        self.interaction
            .update_drag(x, y, &self.geometry, &mut self.canvas)
    }

    pub fn end_drag(&mut self) -> Option<DragOutcome> {
        self.interaction
            .end_drag(&mut self.placement, &self.geometry, &mut self.canvas)
    }

    pub fn cancel_drag(&mut self) {
        if self.interaction.cancel_drag().is_some() {
            // Growth during the drag is not kept.
            self.canvas = Canvas::fit(&self.placement, &self.geometry);
        }
    }
}

impl Default for PertChart {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{TaskGraph, TaskRecord};
    use crate::layout::GridCell;

    fn chain() -> TaskGraph {
        let mut graph = TaskGraph::new();
        graph
            .add_task(TaskRecord::new(1, "Design"))
            .add_task(TaskRecord::new(2, "Build"))
            .add_task(TaskRecord::new(3, "Ship"))
            .add_dependency(1, 2)
            .add_dependency(2, 3);
        graph
    }

    #[test]
    fn rebuild_lays_out_and_sizes_canvas() {
        let mut chart = PertChart::default();
        chart.rebuild(&chain()).unwrap();
        assert_eq!(chart.placement().cell(TaskId(3)), Some(GridCell::new(2, 0)));
        assert_eq!(chart.canvas(), Canvas { width: 425.0, height: 90.0 });
        assert!(chart.last_failure().is_none());
    }

    #[test]
    fn failed_layout_falls_back_to_a_list() {
        let mut graph = chain();
        graph.add_dependency(3, 2);
        let mut chart = PertChart::default();
        assert!(chart.rebuild(&graph).is_err());
        assert!(chart.last_failure().is_some());
        assert_eq!(chart.placement().cell(TaskId(2)), Some(GridCell::new(0, 1)));
        assert_eq!(chart.layout().nodes.len(), 3);
    }

    #[test]
    fn drag_draft_moves_node_and_edges_in_layout() {
        let mut chart = PertChart::default();
        chart.rebuild(&chain()).unwrap();
        assert_eq!(chart.begin_drag_at(150.0, 10.0), Some(TaskId(2)));
        chart.update_drag(150.0, 200.0);
        let layout = chart.layout();
        let rect = layout.node(TaskId(2)).unwrap().rect;
        assert_eq!((rect.x, rect.y), (145.0, 195.0));
        let edge = layout.edge(TaskId(1), TaskId(2)).unwrap();
        assert_eq!(edge.points.last(), Some(&(145.0, 230.0)));
        // Committed state is untouched until the drag ends.
        assert_eq!(chart.placement().get(TaskId(2)).map(|n| n.y), Some(5.0));

        let outcome = chart.end_drag().unwrap();
        assert_eq!((outcome.snapped.x, outcome.snapped.y), (145.0, 175.0));
        assert_eq!(chart.placement().get(TaskId(2)).map(|n| n.y), Some(175.0));
        assert_eq!(chart.placement().cell(TaskId(2)), Some(GridCell::new(1, 0)));
    }

    #[test]
    fn refresh_keeps_manual_positions() {
        let mut chart = PertChart::default();
        chart.rebuild(&chain()).unwrap();
        chart.begin_drag(TaskId(3));
        chart.update_drag(285.0, 300.0);
        chart.end_drag();

        let mut updated = chain();
        updated.task_mut(TaskId(3)).unwrap().name = "Launch".to_string();
        updated.add_task(TaskRecord::new(4, "Extra"));
        assert_eq!(chart.refresh(&updated), 3);
        let layout = chart.layout();
        assert_eq!(layout.node(TaskId(3)).unwrap().name, "Launch");
        assert_eq!(layout.node(TaskId(3)).unwrap().rect.y, 260.0);
        assert!(layout.node(TaskId(4)).is_none());
    }

    #[test]
    fn rebuild_cancels_drag_and_resets_positions() {
        let mut chart = PertChart::default();
        chart.rebuild(&chain()).unwrap();
        chart.begin_drag(TaskId(1));
        chart.update_drag(900.0, 900.0);
        chart.rebuild(&chain()).unwrap();
        assert_eq!(*chart.interaction_state(), InteractionState::Idle);
        assert_eq!(chart.canvas().width, 425.0);
    }
}
