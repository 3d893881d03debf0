mod crossing;
mod error;
mod geometry;
mod grid;
mod ranking;
mod routing;
pub(crate) mod types;

pub use error::{LayoutError, fallback_placement};
pub use geometry::{Canvas, GridGeometry};
pub use grid::{PlacedNode, Placement};
pub use routing::{RouteStyle, arrowhead, route_edge};
pub use types::*;

use std::collections::HashMap;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::TaskId;
use crate::model::GraphModel;

use error::PassBudget;

/// Working state of one layout run.
pub(crate) struct LayoutEngine<'a> {
    model: &'a GraphModel,
    placement: Placement,
    budget: PassBudget,
    /// How often the crossing-line pass shifted each node right.
    line_moves: HashMap<TaskId, usize>,
}

impl<'a> LayoutEngine<'a> {
    pub(crate) fn new(model: &'a GraphModel, config: &LayoutConfig) -> Self {
        Self {
            model,
            placement: Placement::new(),
            budget: PassBudget::for_graph(model.len(), config.pass_limit_factor),
            line_moves: HashMap::new(),
        }
    }

    pub(crate) fn into_placement(self) -> Placement {
        self.placement
    }

    fn run(&mut self) -> Result<(), LayoutError> {
        self.assign_columns()?;
        let node_moves = self.avoid_crossing_node()?;
        let line_moves = self.avoid_crossing_line()?;
        let removed = self.placement.remove_empty_columns();
        debug!(
            node_moves,
            line_moves,
            removed_columns = removed,
            passes = self.budget.used(),
            "crossing repair finished"
        );
        Ok(())
    }
}

/// Computes grid cells and pixel positions for every node reachable from a
/// root.
pub fn compute_placement(
    model: &GraphModel,
    config: &LayoutConfig,
) -> Result<Placement, LayoutError> {
    let mut engine = LayoutEngine::new(model, config);
    engine.run()?;
    let mut placement = engine.into_placement();
    placement.apply_geometry(&GridGeometry::from_config(config));
    debug!(
        nodes = placement.len(),
        columns = placement.columns(),
        "placement computed"
    );
    Ok(placement)
}

/// Joins a placement with node attributes and routes one edge per dependency
/// whose endpoints are both placed. Nodes come out in node list order.
pub fn build_layout(model: &GraphModel, placement: &Placement, config: &LayoutConfig) -> PertLayout {
    let geometry = GridGeometry::from_config(config);
    let style = RouteStyle::from_config(config);

    let mut nodes = Vec::with_capacity(placement.len());
    let mut rects: HashMap<TaskId, Rect> = HashMap::new();
    for placed in placement.ordered() {
        let (Some(node), Some(cell)) = (model.node(placed.id), placed.cell) else {
            continue;
        };
        let rect = geometry.rect_at(placed.x, placed.y);
        rects.insert(node.id, rect);
        nodes.push(NodeLayout {
            id: node.id,
            name: node.name.clone(),
            duration: node.duration,
            start: node.start.clone(),
            end: node.end.clone(),
            kind: node.kind,
            critical: node.critical,
            cell,
            rect,
        });
    }

    let edges = model
        .edges()
        .filter_map(|(from, to)| {
            let (from_rect, to_rect) = (rects.get(&from)?, rects.get(&to)?);
            let (points, arrowhead) = route_edge(from_rect, to_rect, &style);
            Some(EdgeLayout {
                from,
                to,
                points,
                arrowhead,
            })
        })
        .collect();

    let (width, height) = geometry.extents(nodes.iter().map(|node| &node.rect));
    PertLayout {
        nodes,
        edges,
        width,
        height,
        columns: placement.columns(),
    }
}

pub fn compute_layout(model: &GraphModel, config: &LayoutConfig) -> Result<PertLayout, LayoutError> {
    let placement = compute_placement(model, config)?;
    Ok(build_layout(model, &placement, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{TaskGraph, TaskRecord};

    fn model(ids: &[u32], deps: &[(u32, u32)]) -> GraphModel {
        let mut graph = TaskGraph::new();
        for id in ids {
            graph.add_task(TaskRecord::new(*id, format!("T{id}")));
        }
        for (from, to) in deps {
            graph.add_dependency(*from, *to);
        }
        GraphModel::from_provider(&graph)
    }

    fn cell(placement: &Placement, id: u32) -> (usize, usize) {
        let cell = placement.cell(TaskId(id)).unwrap();
        (cell.column, cell.row)
    }

    fn assert_no_node_crossings(model: &GraphModel, placement: &Placement) {
        for (from, to) in model.edges() {
            let (Some(a), Some(b)) = (placement.cell(from), placement.cell(to)) else {
                continue;
            };
            assert!(a.column < b.column, "{from} -> {to} does not point right");
            if a.row == b.row {
                for column in a.column + 1..b.column {
                    assert!(
                        !placement.is_occupied(GridCell::new(column, b.row)),
                        "{from} -> {to} runs through column {column}"
                    );
                }
            }
        }
    }

    #[test]
    fn chain_fills_one_row() {
        let model = model(&[1, 2, 3], &[(1, 2), (2, 3)]);
        let placement = compute_placement(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(cell(&placement, 1), (0, 0));
        assert_eq!(cell(&placement, 2), (1, 0));
        assert_eq!(cell(&placement, 3), (2, 0));
        let node = placement.get(TaskId(3)).unwrap();
        assert_eq!((node.x, node.y), (285.0, 5.0));
    }

    #[test]
    fn diamond_joins_in_third_column() {
        let model = model(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let placement = compute_placement(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(cell(&placement, 1), (0, 0));
        assert_eq!(cell(&placement, 2), (1, 0));
        assert_eq!(cell(&placement, 3), (1, 1));
        assert_eq!(cell(&placement, 4), (2, 0));
        assert_eq!(placement.columns(), 3);
    }

    #[test]
    fn skip_edge_is_routed_around_the_middle_node() {
        let model = model(&[1, 2, 3], &[(1, 2), (2, 3), (1, 3)]);
        let placement = compute_placement(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(cell(&placement, 1), (0, 0));
        assert_eq!(cell(&placement, 2), (1, 0));
        assert_eq!(cell(&placement, 3).0, 2);
        assert_no_node_crossings(&model, &placement);
    }

    #[test]
    fn independent_roots_stack_in_first_column() {
        let model = model(&[1, 2, 3], &[]);
        let placement = compute_placement(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(cell(&placement, 1), (0, 0));
        assert_eq!(cell(&placement, 2), (0, 1));
        assert_eq!(cell(&placement, 3), (0, 2));
    }

    #[test]
    fn crossing_arrows_are_untangled() {
        // 2 -> 4 dips below 3 -> 5, so 2 and its successor move one column right.
        let model = model(
            &[1, 2, 3, 4, 5],
            &[(1, 2), (1, 3), (2, 4), (3, 5), (3, 4)],
        );
        let placement = compute_placement(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(cell(&placement, 1), (0, 0));
        assert_eq!(cell(&placement, 2), (2, 0));
        assert_eq!(cell(&placement, 3), (1, 1));
        assert_eq!(cell(&placement, 4), (3, 1));
        assert_eq!(cell(&placement, 5), (3, 2));
        assert_no_node_crossings(&model, &placement);
    }

    #[test]
    fn pass_budget_covers_crossing_repair() {
        let model = model(
            &[1, 2, 3, 4, 5],
            &[(1, 2), (1, 3), (2, 4), (3, 5), (3, 4)],
        );
        let config = LayoutConfig::default();

        let mut layering = LayoutEngine::new(&model, &config);
        layering.assign_columns().unwrap();
        let layering_passes = layering.budget.used();

        let mut full = LayoutEngine::new(&model, &config);
        full.run().unwrap();
        let needed = full.budget.used();
        assert!(!full.line_moves.is_empty(), "line repair never ran");
        assert!(needed > layering_passes);

        // A budget that covers layering but not the repair passes trips mid-repair.
        let mut tight = LayoutEngine::new(&model, &config);
        tight.budget = PassBudget::with_limit(needed - 1, model.len());
        assert_eq!(
            tight.run(),
            Err(LayoutError::PassLimitExceeded {
                limit: needed - 1,
                nodes: 5
            })
        );

        let mut exact = LayoutEngine::new(&model, &config);
        exact.budget = PassBudget::with_limit(needed, model.len());
        assert!(exact.run().is_ok());
    }

    #[test]
    fn roots_are_never_shifted() {
        // 1 -> 4 and 2 -> 3 cross, but both sources are roots.
        let model = model(
            &[1, 2, 3, 4, 5],
            &[(1, 4), (2, 3), (2, 4), (3, 5), (4, 5)],
        );
        let placement = compute_placement(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(cell(&placement, 1), (0, 0));
        assert_eq!(cell(&placement, 2), (0, 1));
        assert_eq!(cell(&placement, 5), (2, 0));
        assert_no_node_crossings(&model, &placement);
    }

    #[test]
    fn empty_graph_has_empty_layout() {
        let model = model(&[], &[]);
        let layout = compute_layout(&model, &LayoutConfig::default()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.columns, 0);
    }

    #[test]
    fn cycle_reports_layout_error() {
        let model = model(&[1, 2, 3], &[(1, 2), (2, 3), (3, 2)]);
        let err = compute_layout(&model, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, LayoutError::ColumnOverflow { .. }));
    }

    #[test]
    fn layout_routes_every_placed_edge() {
        let model = model(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let layout = compute_layout(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes.len(), 4);
        assert_eq!(layout.edges.len(), 4);
        let edge = layout.edge(TaskId(3), TaskId(4)).unwrap();
        assert_eq!(edge.points.first(), Some(&(255.0, 125.0)));
        assert_eq!(edge.points.last(), Some(&(285.0, 40.0)));
        assert_eq!(edge.arrowhead[0], (285.0, 40.0));
        assert_eq!(layout.width, 285.0 + 110.0 + 30.0);
        assert_eq!(layout.height, 90.0 + 70.0 + 15.0);
    }

    #[test]
    fn unreachable_nodes_are_not_laid_out() {
        let model = model(&[1, 2, 3], &[(2, 3), (3, 2)]);
        let layout = compute_layout(&model, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
    }
}
