use crate::layout::PertLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON view of a computed chart, for debugging and external tooling.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub columns: usize,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: u32,
    pub name: String,
    pub start: String,
    pub end: String,
    pub duration: f64,
    pub kind: String,
    pub critical: bool,
    pub column: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub from: u32,
    pub to: u32,
    pub points: Vec<[f32; 2]>,
    pub arrowhead: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &PertLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.0,
                name: node.name.clone(),
                start: node.start.clone(),
                end: node.end.clone(),
                duration: node.duration,
                kind: format!("{:?}", node.kind).to_lowercase(),
                critical: node.critical,
                column: node.cell.column,
                row: node.cell.row,
                x: node.rect.x,
                y: node.rect.y,
                width: node.rect.width,
                height: node.rect.height,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.0,
                to: edge.to.0,
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
                arrowhead: edge.arrowhead.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            canvas_width: layout.width,
            canvas_height: layout.height,
            columns: layout.columns,
            nodes,
            edges,
        }
    }
}

pub fn layout_to_json(layout: &PertLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: &Path, layout: &PertLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}
