use tracing::{debug, warn};

use crate::ir::TaskId;

use super::{LayoutEngine, LayoutError};

impl LayoutEngine<'_> {
    /// Places every root in column 0, then walks the columns left to right and
    /// re-adds each successor one column past its predecessor. A node reached
    /// several times keeps the last (rightmost) column, so it always ends up
    /// right of all of its placed predecessors.
    pub(super) fn assign_columns(&mut self) -> Result<(), LayoutError> {
        let model = self.model;
        for root in model.roots() {
            self.placement.add(root.id, 0);
        }

        let column_limit = model.len();
        let mut column = 0usize;
        loop {
            let in_column = self.placement.nodes_in_column(column);
            if in_column.is_empty() {
                break;
            }
            self.budget.tick()?;

            let demanded: Vec<TaskId> = in_column
                .iter()
                .flat_map(|id| model.successors(*id).iter().copied())
                .collect();
            if !demanded.is_empty() && column + 1 >= column_limit {
                return Err(LayoutError::ColumnOverflow {
                    limit: column_limit,
                });
            }
            for successor in demanded {
                self.placement.add(successor, column + 1);
            }
            column += 1;
        }

        let unplaced = model.len() - self.placement.ordered().len();
        if unplaced > 0 {
            warn!(unplaced, "tasks not reachable from any root were left out");
        }
        debug!(columns = self.placement.columns(), "columns assigned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LayoutConfig;
    use crate::ir::{TaskGraph, TaskId, TaskRecord};
    use crate::layout::{GridCell, LayoutEngine, LayoutError};
    use crate::model::GraphModel;

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

    #[test]
    fn successor_lands_right_of_its_latest_predecessor() {
        let model = model(&[1, 2, 3, 4], &[(1, 2), (2, 3), (1, 4), (3, 4)]);
        let config = LayoutConfig::default();
        let mut engine = LayoutEngine::new(&model, &config);
        engine.assign_columns().unwrap();
        let placement = engine.into_placement();
        assert_eq!(placement.cell(TaskId(1)), Some(GridCell::new(0, 0)));
        assert_eq!(placement.cell(TaskId(2)), Some(GridCell::new(1, 0)));
        assert_eq!(placement.cell(TaskId(3)), Some(GridCell::new(2, 0)));
        assert_eq!(placement.cell(TaskId(4)), Some(GridCell::new(3, 0)));
        assert_eq!(placement.columns(), 4);
    }

    #[test]
    fn cycle_below_a_root_overflows() {
        let model = model(&[1, 2, 3], &[(1, 2), (2, 3), (3, 2)]);
        let config = LayoutConfig::default();
        let mut engine = LayoutEngine::new(&model, &config);
        assert_eq!(
            engine.assign_columns(),
            Err(LayoutError::ColumnOverflow { limit: 3 })
        );
    }

    #[test]
    fn rootless_cycle_is_left_unplaced() {
        let model = model(&[1, 2, 3], &[(2, 3), (3, 2)]);
        let config = LayoutConfig::default();
        let mut engine = LayoutEngine::new(&model, &config);
        engine.assign_columns().unwrap();
        let placement = engine.into_placement();
        assert_eq!(placement.cell(TaskId(1)), Some(GridCell::new(0, 0)));
        assert_eq!(placement.cell(TaskId(2)), None);
        assert_eq!(placement.cell(TaskId(3)), None);
    }
}
