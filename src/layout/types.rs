use serde::Serialize;

use crate::ir::{NodeKind, TaskId};

/// A (column, row) slot of the layout grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridCell {
    pub column: usize,
    pub row: usize,
}

impl GridCell {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Left/top edges are inside, right/bottom edges are not.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn right_center(&self) -> (f32, f32) {
        (self.right(), self.y + self.height / 2.0)
    }

    pub fn left_center(&self) -> (f32, f32) {
        (self.x, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: TaskId,
    pub name: String,
    pub duration: f64,
    pub start: String,
    pub end: String,
    pub kind: NodeKind,
    pub critical: bool,
    pub cell: GridCell,
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub from: TaskId,
    pub to: TaskId,
    pub points: Vec<(f32, f32)>,
    /// Tip first, then the two base corners.
    pub arrowhead: [(f32, f32); 3],
}

/// Everything the presentation layer needs to draw one chart.
#[derive(Debug, Clone, Default)]
pub struct PertLayout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
    pub columns: usize,
}

impl PertLayout {
    pub fn node(&self, id: TaskId) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, from: TaskId, to: TaskId) -> Option<&EdgeLayout> {
        self.edges
            .iter()
            .find(|edge| edge.from == from && edge.to == to)
    }
}
