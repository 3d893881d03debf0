use crate::config::RenderConfig;
use crate::ir::NodeKind;
use crate::layout::{EdgeLayout, NodeLayout, PertLayout};
use crate::text_metrics;
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Line height relative to the font size.
const LINE_HEIGHT: f32 = 1.3;
/// Space between the name line and the separator.
const SEPARATOR_GAP: f32 = 5.0;

pub fn render_svg(layout: &PertLayout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    );

    for node in &layout.nodes {
        node_svg(&mut svg, node, theme, config);
    }
    for edge in &layout.edges {
        edge_svg(&mut svg, edge, theme);
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(svg: &mut String, node: &NodeLayout, theme: &Theme, config: &RenderConfig) {
    let rect = node.rect;
    let border = theme.border_for(node.kind);
    let fill = theme.fill_for(node.critical);
    let radius = config.corner_radius;
    let line_height = theme.font_size * LINE_HEIGHT;
    let text_x = rect.x + config.text_padding_x;
    let text_width = (rect.width - 2.0 * config.text_padding_x).max(0.0);

    let _ = write!(
        svg,
        "<g class=\"task{}\" data-task-id=\"{}\">",
        kind_class(node.kind),
        node.id
    );
    let _ = write!(
        svg,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{fill}\" stroke=\"{border}\" stroke-width=\"1\"/>",
        rect.x, rect.y, rect.width, rect.height
    );
    // Inner border.
    let inner_radius = (radius - 2.0).max(0.0);
    let _ = write!(
        svg,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{inner_radius:.2}\" ry=\"{inner_radius:.2}\" fill=\"none\" stroke=\"{border}\" stroke-width=\"1\"/>",
        rect.x + 2.0,
        rect.y + 2.0,
        (rect.width - 4.0).max(0.0),
        (rect.height - 4.0).max(0.0)
    );

    let name = text_metrics::truncate_to_width(
        &node.name,
        text_width,
        theme.font_size,
        &theme.font_family,
        true,
    );
    text_svg(svg, text_x, rect.y + line_height, &name, theme, true);

    let separator_y = rect.y + line_height + SEPARATOR_GAP;
    let _ = write!(
        svg,
        "<line x1=\"{:.2}\" y1=\"{separator_y:.2}\" x2=\"{:.2}\" y2=\"{separator_y:.2}\" stroke=\"{border}\" stroke-width=\"1\"/>",
        rect.x,
        rect.right()
    );

    let details = [
        format!("{}: {}", config.start_label, node.start),
        format!("{}: {}", config.end_label, node.end),
        format!("{}: {}", config.duration_label, format_duration(node.duration)),
    ];
    for (idx, line) in details.iter().enumerate() {
        let baseline = separator_y + line_height * (idx as f32 + 1.0);
        let line = text_metrics::truncate_to_width(
            line,
            text_width,
            theme.font_size,
            &theme.font_family,
            false,
        );
        text_svg(svg, text_x, baseline, &line, theme, false);
    }
    svg.push_str("</g>");
}

fn text_svg(svg: &mut String, x: f32, y: f32, text: &str, theme: &Theme, bold: bool) {
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    let _ = write!(
        svg,
        "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{weight}>{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(text)
    );
}

fn edge_svg(svg: &mut String, edge: &EdgeLayout, theme: &Theme) {
    let _ = write!(
        svg,
        "<polyline class=\"dependency\" data-from=\"{}\" data-to=\"{}\" points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
        edge.from,
        edge.to,
        points_attr(&edge.points),
        theme.arrow_color
    );
    let _ = write!(
        svg,
        "<polygon points=\"{}\" fill=\"{}\"/>",
        points_attr(&edge.arrowhead),
        theme.arrow_color
    );
}

fn points_attr(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn kind_class(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Normal => "",
        NodeKind::Super => " super",
        NodeKind::Milestone => " milestone",
    }
}

/// Whole durations print without a fraction.
pub fn format_duration(duration: f64) -> String {
    if duration.fract() == 0.0 && duration.abs() < 1e15 {
        format!("{}", duration as i64)
    } else {
        format!("{duration}")
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = primary_family(&theme.font_family);
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(feature = "png")]
fn primary_family(font_family: &str) -> String {
    font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .find(|part| !part.is_empty())
        .unwrap_or("sans-serif")
        .to_string()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
