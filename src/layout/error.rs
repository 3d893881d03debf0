use thiserror::Error;

use crate::model::GraphModel;

use super::{GridGeometry, Placement};

/// The layout pipeline gave up on a graph. Callers fall back to
/// [`fallback_placement`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout failed: column assignment ran past {limit} columns, the dependency graph has a cycle")]
    ColumnOverflow { limit: usize },
    #[error("layout failed: no convergence within {limit} passes over {nodes} nodes")]
    PassLimitExceeded { limit: usize, nodes: usize },
}

/// Counts layout passes and stops runaway repair loops.
#[derive(Debug, Clone)]
pub(super) struct PassBudget {
    used: usize,
    limit: usize,
    nodes: usize,
}

impl PassBudget {
    /// `factor * (V + 1) * (maxColumns + 1)`; an acyclic graph never needs more
    /// than `V` columns.
    pub(super) fn for_graph(nodes: usize, factor: usize) -> Self {
        let limit = factor
            .max(1)
            .saturating_mul(nodes + 1)
            .saturating_mul(nodes + 1);
        Self::with_limit(limit, nodes)
    }

    pub(super) fn with_limit(limit: usize, nodes: usize) -> Self {
        Self {
            used: 0,
            limit,
            nodes,
        }
    }

    pub(super) fn tick(&mut self) -> Result<(), LayoutError> {
        self.used += 1;
        if self.used > self.limit {
            return Err(LayoutError::PassLimitExceeded {
                limit: self.limit,
                nodes: self.nodes,
            });
        }
        Ok(())
    }

    pub(super) fn used(&self) -> usize {
        self.used
    }
}

/// Top-to-bottom list of every node in model order, used when the real layout
/// failed.
pub fn fallback_placement(model: &GraphModel, geometry: &GridGeometry) -> Placement {
    let mut placement = Placement::new();
    for node in model.nodes() {
        placement.add(node.id, 0);
    }
    placement.apply_geometry(geometry);
    placement
}
