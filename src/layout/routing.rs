use crate::config::LayoutConfig;

use super::Rect;

const EPS: f32 = 1e-4;

/// Arrow sizes used when routing dependency edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStyle {
    pub column_gap: f32,
    pub arrow_width: f32,
    pub arrow_height: f32,
    pub corner: f32,
}

impl RouteStyle {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            column_gap: config.column_gap,
            arrow_width: config.arrow_width,
            arrow_height: config.arrow_height,
            corner: config.arrow_corner,
        }
    }
}

/// Elbow route from the right-center of `from` to the left-center of `to`:
/// out horizontally, bend halfway through the column gap, run vertically to the
/// target row and go in horizontally. Returns the polyline and the arrowhead.
pub fn route_edge(from: &Rect, to: &Rect, style: &RouteStyle) -> (Vec<(f32, f32)>, [(f32, f32); 3]) {
    let start = from.right_center();
    let end = to.left_center();
    let dy = end.1 - start.1;

    let points = if dy.abs() <= EPS {
        vec![start, end]
    } else {
        let mid_x = start.0 + style.column_gap / 2.0;
        let corner = style
            .corner
            .min(dy.abs() / 2.0)
            .min(style.column_gap / 2.0)
            .max(0.0);
        let dir = dy.signum();
        compress_path(&[
            start,
            (mid_x - corner, start.1),
            (mid_x, start.1 + dir * corner),
            (mid_x, end.1 - dir * corner),
            (mid_x + corner, end.1),
            end,
        ])
    };

    let previous = points[points.len() - 2];
    let head = arrowhead(end, previous, style.arrow_width, style.arrow_height);
    (points, head)
}

/// Triangle with its tip at `tip`, pointing away from `previous`.
pub fn arrowhead(tip: (f32, f32), previous: (f32, f32), width: f32, height: f32) -> [(f32, f32); 3] {
    let dx = tip.0 - previous.0;
    let dy = tip.1 - previous.1;
    let len = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = if len <= EPS { (1.0, 0.0) } else { (dx / len, dy / len) };
    let base = (tip.0 - ux * width, tip.1 - uy * width);
    let half = height / 2.0;
    // Perpendicular (-uy, ux); the first corner is the upper one for a rightward arrow.
    [
        tip,
        (base.0 + uy * half, base.1 - ux * half),
        (base.0 - uy * half, base.1 + ux * half),
    ]
}

/// Drops repeated points, keeping both endpoints.
fn compress_path(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let mut out: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    for (idx, point) in points.iter().enumerate() {
        if let Some(prev) = out.last() {
            let same = (point.0 - prev.0).abs() <= EPS && (point.1 - prev.1).abs() <= EPS;
            if same && idx != points.len() - 1 {
                continue;
            }
            if same {
                out.pop();
            }
        }
        out.push(*point);
    }
    out
}
