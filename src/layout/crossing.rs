use std::collections::HashSet;

use tracing::trace;

use crate::ir::TaskId;

use super::{GridCell, LayoutEngine, LayoutError};

impl LayoutEngine<'_> {
    /// True when an arrow from one of the node's predecessors would have to cross
    /// a node sitting in an intermediate column on the same row.
    pub(super) fn is_crossing_node(&self, id: TaskId) -> bool {
        let Some(cell) = self.placement.cell(id) else {
            return false;
        };
        self.model.predecessors(id).iter().any(|pred| {
            let Some(pred_cell) = self.placement.cell(*pred) else {
                return false;
            };
            (pred_cell.column + 1..cell.column)
                .any(|column| self.placement.is_occupied(GridCell::new(column, cell.row)))
        })
    }

    /// True when the node's outgoing arrows span rows that another node of the
    /// same column also sends arrows through.
    pub(super) fn is_crossing_arrow(&self, id: TaskId) -> bool {
        let Some(cell) = self.placement.cell(id) else {
            return false;
        };
        let successors = self.model.successors(id);
        let rows: Vec<usize> = successors
            .iter()
            .filter_map(|succ| self.placement.cell(*succ))
            .map(|succ| succ.row)
            .collect();
        let (Some(&min_row), Some(&max_row)) = (rows.iter().min(), rows.iter().max()) else {
            return false;
        };
        let goes_up = min_row < cell.row;
        let goes_down = max_row > cell.row;
        if !goes_up && !goes_down {
            return false;
        }

        for other in self.placement.nodes_in_column(cell.column) {
            if other == id {
                continue;
            }
            for succ in self.model.successors(other) {
                if successors.contains(succ) {
                    continue;
                }
                let Some(succ_cell) = self.placement.cell(*succ) else {
                    continue;
                };
                if (goes_up && succ_cell.row <= cell.row) || (goes_down && succ_cell.row >= cell.row)
                {
                    return true;
                }
            }
        }
        false
    }

    /// Moves the node down its column to the next free row.
    fn move_down(&mut self, id: TaskId) {
        let Some(cell) = self.placement.cell(id) else {
            return;
        };
        let row = self.placement.first_free_row(cell.column, cell.row + 1);
        self.placement.relocate(id, GridCell::new(cell.column, row));
    }

    /// Sweeps the columns from right to left and pushes every node that blocks
    /// a predecessor arrow down until it no longer does. A column that needed
    /// moves makes the sweep step one column right again.
    pub(super) fn avoid_crossing_node(&mut self) -> Result<usize, LayoutError> {
        self.budget.tick()?;
        let mut moves = 0usize;
        if self.placement.columns() < 2 {
            return Ok(moves);
        }
        let mut column = self.placement.columns() - 1;
        while column > 0 {
            let mut moved = false;
            for id in self.placement.nodes_in_column(column) {
                while self.is_crossing_node(id) {
                    self.move_down(id);
                    moved = true;
                    moves += 1;
                }
            }
            if moved && column + 1 < self.placement.columns() {
                column += 1;
            } else {
                column -= 1;
            }
        }
        Ok(moves)
    }

    /// Repeatedly scans columns holding at least two nodes for a node whose
    /// arrows cross, shifts it right and re-runs the node pass. Roots never
    /// move, and a node already shifted `V` times is not shifted again.
    pub(super) fn avoid_crossing_line(&mut self) -> Result<usize, LayoutError> {
        let move_cap = self.model.len().max(1);
        let mut moves = 0usize;
        loop {
            self.budget.tick()?;
            let Some(id) = self.find_crossing_arrow(move_cap) else {
                break;
            };
            trace!(task = %id, "arrow crossing, shifting right");
            self.move_right(id)?;
            *self.line_moves.entry(id).or_default() += 1;
            self.avoid_crossing_node()?;
            moves += 1;
        }
        Ok(moves)
    }

    fn find_crossing_arrow(&self, move_cap: usize) -> Option<TaskId> {
        for column in 0..self.placement.columns() {
            let in_column = self.placement.nodes_in_column(column);
            if in_column.len() < 2 {
                continue;
            }
            for id in in_column {
                if self.model.is_root(id) {
                    continue;
                }
                if self.line_moves.get(&id).copied().unwrap_or(0) >= move_cap {
                    continue;
                }
                if self.is_crossing_arrow(id) {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Shifts the node and everything downstream of it one column right.
    /// Successors move before their predecessors, and a node already sitting in
    /// a target cell is shifted out of the way first, so every arrow keeps
    /// pointing rightwards at every step.
    pub(super) fn move_right(&mut self, id: TaskId) -> Result<(), LayoutError> {
        self.budget.tick()?;
        for member in self.successor_closure(id) {
            self.step_right(member)?;
        }
        Ok(())
    }

    fn step_right(&mut self, id: TaskId) -> Result<(), LayoutError> {
        let Some(cell) = self.placement.cell(id) else {
            return Ok(());
        };
        let target = GridCell::new(cell.column + 1, cell.row);
        // The occupant sits right of `id`, so its closure never reaches back
        // into this column and the cell is free afterwards.
        if let Some(occupant) = self.placement.node_at(target) {
            self.move_right(occupant)?;
        }
        self.placement.relocate(id, target);
        Ok(())
    }

    /// The node and all nodes reachable from it, each successor listed before
    /// any of its predecessors.
    fn successor_closure(&self, start: TaskId) -> Vec<TaskId> {
        let mut order = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut stack: Vec<(TaskId, usize)> = vec![(start, 0)];
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            let successors = self.model.successors(node);
            if next < successors.len() {
                top.1 += 1;
                let succ = successors[next];
                if visited.insert(succ) {
                    stack.push((succ, 0));
                }
            } else {
                order.push(node);
                stack.pop();
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LayoutConfig;
    use crate::ir::{TaskGraph, TaskId, TaskRecord};
    use crate::layout::{GridCell, LayoutEngine};
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
    fn skip_edge_through_occupied_cell_is_a_node_crossing() {
        // 1 -> 2 -> 3 and 1 -> 3: 2 sits between 1 and 3 on row 0.
        let model = model(&[1, 2, 3], &[(1, 2), (2, 3), (1, 3)]);
        let config = LayoutConfig::default();
        let mut engine = LayoutEngine::new(&model, &config);
        engine.assign_columns().unwrap();
        assert!(engine.is_crossing_node(TaskId(3)));
        assert_eq!(engine.avoid_crossing_node().unwrap(), 1);
        let placement = engine.into_placement();
        assert_eq!(placement.cell(TaskId(3)), Some(GridCell::new(2, 1)));
    }

    #[test]
    fn arrows_from_one_column_crossing_each_other() {
        let model = model(&[1, 2, 3, 4], &[(1, 4), (2, 3)]);
        let config = LayoutConfig::default();
        let mut engine = LayoutEngine::new(&model, &config);
        // 1 at (0,0) -> 4 at (1,1) and 2 at (0,1) -> 3 at (1,0).
        engine.placement.add(TaskId(1), 0);
        engine.placement.add(TaskId(2), 0);
        engine.placement.add(TaskId(3), 1);
        engine.placement.add(TaskId(4), 1);
        assert!(engine.is_crossing_arrow(TaskId(1)));
        assert!(engine.is_crossing_arrow(TaskId(2)));
        assert!(!engine.is_crossing_arrow(TaskId(3)));
    }

    #[test]
    fn move_right_shifts_downstream_and_displaces_occupants() {
        let model = model(&[1, 2, 3, 4], &[(1, 2), (2, 3)]);
        let config = LayoutConfig::default();
        let mut engine = LayoutEngine::new(&model, &config);
        engine.placement.add(TaskId(1), 0);
        engine.placement.add(TaskId(2), 1);
        engine.placement.add(TaskId(3), 2);
        engine.placement.add(TaskId(4), 3);
        engine.move_right(TaskId(2)).unwrap();
        let placement = engine.into_placement();
        assert_eq!(placement.cell(TaskId(1)), Some(GridCell::new(0, 0)));
        assert_eq!(placement.cell(TaskId(2)), Some(GridCell::new(2, 0)));
        assert_eq!(placement.cell(TaskId(3)), Some(GridCell::new(3, 0)));
        assert_eq!(placement.cell(TaskId(4)), Some(GridCell::new(4, 0)));
    }

    #[test]
    fn closure_lists_successors_first() {
        let model = model(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let config = LayoutConfig::default();
        let engine = LayoutEngine::new(&model, &config);
        let order = engine.successor_closure(TaskId(1));
        assert_eq!(order, vec![TaskId(4), TaskId(2), TaskId(3), TaskId(1)]);
    }
}
