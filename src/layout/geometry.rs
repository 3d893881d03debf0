use crate::config::LayoutConfig;

use super::{GridCell, Placement, Rect};

/// Maps grid cells to pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub node_width: f32,
    pub node_height: f32,
    pub column_gap: f32,
    pub row_gap: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl GridGeometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            node_width: config.node_width,
            node_height: config.node_height,
            column_gap: config.column_gap,
            row_gap: config.row_gap,
            offset_x: config.offset_x,
            offset_y: config.offset_y,
        }
    }

    pub fn column_pitch(&self) -> f32 {
        self.node_width + self.column_gap
    }

    pub fn row_pitch(&self) -> f32 {
        self.node_height + self.row_gap
    }

    pub fn cell_origin(&self, cell: GridCell) -> (f32, f32) {
        (
            self.offset_x + cell.column as f32 * self.column_pitch(),
            self.offset_y + cell.row as f32 * self.row_pitch(),
        )
    }

    pub fn rect_at(&self, x: f32, y: f32) -> Rect {
        Rect::new(x, y, self.node_width, self.node_height)
    }

    /// Rounds a point down onto the grid line at or before it. Points before the
    /// origin land on the origin.
    pub fn snap(&self, x: f32, y: f32) -> (f32, f32) {
        let column = ((x - self.offset_x) / self.column_pitch()).floor().max(0.0);
        let row = ((y - self.offset_y) / self.row_pitch()).floor().max(0.0);
        (
            self.offset_x + column * self.column_pitch(),
            self.offset_y + row * self.row_pitch(),
        )
    }

    /// Snaps a dropped rectangle: the column comes from its center, the row
    /// from the pointer that released it.
    pub fn snap_drop(&self, rect: &Rect, pointer: (f32, f32)) -> Rect {
        let (center_x, _) = rect.center();
        let (x, y) = self.snap(center_x, pointer.1);
        self.rect_at(x, y)
    }

    /// Canvas size covering every rectangle plus one trailing gap.
    pub fn extents<'a>(&self, rects: impl IntoIterator<Item = &'a Rect>) -> (f32, f32) {
        let mut max_x: Option<f32> = None;
        let mut max_y: Option<f32> = None;
        for rect in rects {
            max_x = Some(max_x.map_or(rect.right(), |v| v.max(rect.right())));
            max_y = Some(max_y.map_or(rect.bottom(), |v| v.max(rect.bottom())));
        }
        match (max_x, max_y) {
            (Some(x), Some(y)) => (x + self.column_gap, y + self.row_gap),
            _ => (self.offset_x + self.column_gap, self.offset_y + self.row_gap),
        }
    }
}

/// Size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    /// Smallest canvas showing every placed node.
    pub fn fit(placement: &Placement, geometry: &GridGeometry) -> Self {
        let rects: Vec<Rect> = placement
            .ordered()
            .into_iter()
            .map(|node| geometry.rect_at(node.x, node.y))
            .collect();
        let (width, height) = geometry.extents(rects.iter());
        Self { width, height }
    }

    /// Grows the canvas so `rect` plus one trailing gap stays visible. Returns
    /// whether anything changed.
    pub fn grow_to_fit(&mut self, rect: &Rect, geometry: &GridGeometry) -> bool {
        let mut grown = false;
        let needed_width = rect.right() + geometry.column_gap;
        if needed_width > self.width {
            self.width = needed_width;
            grown = true;
        }
        let needed_height = rect.bottom() + geometry.row_gap;
        if needed_height > self.height {
            self.height = needed_height;
            grown = true;
        }
        grown
    }
}
