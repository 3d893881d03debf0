use std::collections::HashMap;

use crate::ir::TaskId;

use super::{GridCell, GridGeometry, Rect};

/// Layout state of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: TaskId,
    /// `None` while the node has not been placed.
    pub cell: Option<GridCell>,
    pub x: f32,
    pub y: f32,
    /// Position in node list order; bumped whenever the node is (re)inserted.
    seq: u64,
}

/// Node positions on the grid. The cell → node mapping is kept injective by
/// every mutating method.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    nodes: Vec<PlacedNode>,
    index: HashMap<TaskId, usize>,
    occupancy: HashMap<GridCell, TaskId>,
    columns: usize,
    next_seq: u64,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&PlacedNode> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn cell(&self, id: TaskId) -> Option<GridCell> {
        self.get(id).and_then(|node| node.cell)
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.occupancy.contains_key(&cell)
    }

    pub fn node_at(&self, cell: GridCell) -> Option<TaskId> {
        self.occupancy.get(&cell).copied()
    }

    /// Placed nodes in node list order.
    pub fn ordered(&self) -> Vec<&PlacedNode> {
        let mut placed: Vec<&PlacedNode> = self
            .nodes
            .iter()
            .filter(|node| node.cell.is_some())
            .collect();
        placed.sort_by_key(|node| node.seq);
        placed
    }

    /// Ids of the nodes in `column`, in node list order.
    pub fn nodes_in_column(&self, column: usize) -> Vec<TaskId> {
        let mut in_column: Vec<&PlacedNode> = self
            .nodes
            .iter()
            .filter(|node| node.cell.is_some_and(|cell| cell.column == column))
            .collect();
        in_column.sort_by_key(|node| node.seq);
        in_column.into_iter().map(|node| node.id).collect()
    }

    pub fn first_free_row(&self, column: usize, from: usize) -> usize {
        let mut row = from;
        while self.is_occupied(GridCell::new(column, row)) {
            row += 1;
        }
        row
    }

    /// Inserts `id` at the first free row of `column` and moves it to the end of
    /// node list order.
    pub(crate) fn add(&mut self, id: TaskId, column: usize) -> GridCell {
        if self.cell(id).is_some() {
            self.remove(id);
        }
        let cell = GridCell::new(column, self.first_free_row(column, 0));
        let seq = self.bump_seq();
        let idx = self.slot(id);
        let node = &mut self.nodes[idx];
        node.cell = Some(cell);
        node.seq = seq;
        self.occupancy.insert(cell, id);
        self.columns = self.columns.max(column + 1);
        cell
    }

    /// Takes `id` off the grid. Nodes below it in the same column move up one
    /// row and trailing empty columns are dropped.
    pub(crate) fn remove(&mut self, id: TaskId) {
        let Some(&idx) = self.index.get(&id) else {
            return;
        };
        let Some(cell) = self.nodes[idx].cell.take() else {
            return;
        };
        self.occupancy.remove(&cell);

        let mut below: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node.cell {
                Some(c) if c.column == cell.column && c.row > cell.row => Some((i, c.row)),
                _ => None,
            })
            .collect();
        below.sort_by_key(|(_, row)| *row);
        for (i, row) in below {
            let old = GridCell::new(cell.column, row);
            let new = GridCell::new(cell.column, row - 1);
            let moved = self.nodes[i].id;
            self.occupancy.remove(&old);
            self.occupancy.insert(new, moved);
            self.nodes[i].cell = Some(new);
        }

        if cell.column + 1 == self.columns {
            while self.columns > 0 && self.column_is_empty(self.columns - 1) {
                self.columns -= 1;
            }
        }
    }

    /// Moves a placed node to `cell`, which must be free.
    pub(crate) fn relocate(&mut self, id: TaskId, cell: GridCell) {
        debug_assert!(!self.is_occupied(cell), "relocating onto an occupied cell");
        let Some(&idx) = self.index.get(&id) else {
            return;
        };
        if let Some(old) = self.nodes[idx].cell {
            self.occupancy.remove(&old);
        }
        self.nodes[idx].cell = Some(cell);
        self.occupancy.insert(cell, id);
        self.columns = self.columns.max(cell.column + 1);
    }

    pub fn column_is_empty(&self, column: usize) -> bool {
        !self
            .nodes
            .iter()
            .any(|node| node.cell.is_some_and(|cell| cell.column == column))
    }

    /// Renumbers columns contiguously, dropping every empty one.
    pub(crate) fn remove_empty_columns(&mut self) -> usize {
        let mut used = vec![false; self.columns];
        for cell in self.nodes.iter().filter_map(|node| node.cell) {
            used[cell.column] = true;
        }
        let mut remap = vec![0usize; self.columns];
        let mut next = 0usize;
        for (column, is_used) in used.iter().enumerate() {
            remap[column] = next;
            if *is_used {
                next += 1;
            }
        }
        let removed = self.columns - next;
        if removed == 0 {
            return 0;
        }

        self.occupancy.clear();
        for node in &mut self.nodes {
            if let Some(cell) = node.cell.as_mut() {
                cell.column = remap[cell.column];
                self.occupancy.insert(*cell, node.id);
            }
        }
        self.columns = next;
        removed
    }

    /// Sets every placed node's pixel position from its cell.
    pub(crate) fn apply_geometry(&mut self, geometry: &GridGeometry) {
        for node in &mut self.nodes {
            if let Some(cell) = node.cell {
                let (x, y) = geometry.cell_origin(cell);
                node.x = x;
                node.y = y;
            }
        }
    }

    /// Overrides the pixel position of a node, e.g. after a manual drag.
    pub fn set_position(&mut self, id: TaskId, x: f32, y: f32) -> bool {
        let Some(&idx) = self.index.get(&id) else {
            return false;
        };
        self.nodes[idx].x = x;
        self.nodes[idx].y = y;
        true
    }

    pub fn rect(&self, id: TaskId, geometry: &GridGeometry) -> Option<Rect> {
        let node = self.get(id)?;
        node.cell?;
        Some(geometry.rect_at(node.x, node.y))
    }

    fn slot(&mut self, id: TaskId) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(PlacedNode {
            id,
            cell: None,
            x: 0.0,
            y: 0.0,
            seq: 0,
        });
        self.index.insert(id, idx);
        idx
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
