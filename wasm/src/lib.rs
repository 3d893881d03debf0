use pert_chart::config::Config;
use pert_chart::layout_dump::layout_to_json;
use pert_chart::render::render_svg;
use pert_chart::theme::Theme;
use pert_chart::{PertChart, PertLayout, parse_task_graph};
use serde::Deserialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PertRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
}

fn build_config(options: PertRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
        config.render.background = config.theme.background.clone();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    config
}

fn parse_options(options_json: Option<String>) -> Result<PertRenderOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(PertRenderOptions::default()),
    }
}

/// A failed layout still yields the single-column task list.
fn lay_out(graph_json: &str, config: &Config) -> Result<PertLayout, String> {
    let graph = parse_task_graph(graph_json).map_err(|error| error.to_string())?;
    let mut chart = PertChart::new(config.layout.clone());
    if let Err(err) = chart.rebuild(&graph) {
        warn!(error = %err, "rendering tasks as a plain list");
    }
    Ok(chart.layout())
}

fn layout_json(graph_json: &str, options_json: Option<String>) -> Result<String, String> {
    let config = build_config(parse_options(options_json)?);
    let layout = lay_out(graph_json, &config)?;
    layout_to_json(&layout).map_err(|error| error.to_string())
}

fn svg(graph_json: &str, options_json: Option<String>) -> Result<String, String> {
    let config = build_config(parse_options(options_json)?);
    let layout = lay_out(graph_json, &config)?;
    Ok(render_svg(&layout, &config.theme, &config.render))
}

#[wasm_bindgen]
pub fn layout_pert_json(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    layout_json(graph_json, options_json).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_pert_svg(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    svg(graph_json, options_json).map_err(|error| JsValue::from_str(&error))
}
