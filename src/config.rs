use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Horizontal gap between two columns.
    pub column_gap: f32,
    /// Vertical gap between two rows.
    pub row_gap: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub arrow_width: f32,
    pub arrow_height: f32,
    pub arrow_corner: f32,
    /// Multiplier of the `(V + 1) * (maxColumns + 1)` pass budget.
    pub pass_limit_factor: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 110.0,
            node_height: 70.0,
            column_gap: 30.0,
            row_gap: 15.0,
            offset_x: 5.0,
            offset_y: 5.0,
            arrow_width: 15.0,
            arrow_height: 10.0,
            arrow_corner: 6.0,
            pass_limit_factor: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    pub corner_radius: f32,
    pub text_padding_x: f32,
    pub start_label: String,
    pub end_label: String,
    pub duration_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            corner_radius: 8.0,
            text_padding_x: 10.0,
            start_label: "Start".to_string(),
            end_label: "End".to_string(),
            duration_label: "Duration".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    normal_border: Option<String>,
    super_border: Option<String>,
    milestone_border: Option<String>,
    node_fill: Option<String>,
    critical_fill: Option<String>,
    text_color: Option<String>,
    arrow_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    column_gap: Option<f32>,
    row_gap: Option<f32>,
    offset_x: Option<f32>,
    offset_y: Option<f32>,
    arrow_width: Option<f32>,
    arrow_height: Option<f32>,
    arrow_corner: Option<f32>,
    pass_limit_factor: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderFile {
    corner_radius: Option<f32>,
    text_padding_x: Option<f32>,
    start_label: Option<String>,
    end_label: Option<String>,
    duration_label: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeFile>,
    layout: Option<LayoutFile>,
    render: Option<RenderFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme '{other}'"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.normal_border {
            config.theme.normal_border = v;
        }
        if let Some(v) = vars.super_border {
            config.theme.super_border = v;
        }
        if let Some(v) = vars.milestone_border {
            config.theme.milestone_border = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.critical_fill {
            config.theme.critical_fill = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.arrow_color {
            config.theme.arrow_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.column_gap {
            config.layout.column_gap = v;
        }
        if let Some(v) = layout.row_gap {
            config.layout.row_gap = v;
        }
        if let Some(v) = layout.offset_x {
            config.layout.offset_x = v;
        }
        if let Some(v) = layout.offset_y {
            config.layout.offset_y = v;
        }
        if let Some(v) = layout.arrow_width {
            config.layout.arrow_width = v;
        }
        if let Some(v) = layout.arrow_height {
            config.layout.arrow_height = v;
        }
        if let Some(v) = layout.arrow_corner {
            config.layout.arrow_corner = v;
        }
        if let Some(v) = layout.pass_limit_factor {
            config.layout.pass_limit_factor = v.max(1);
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.corner_radius {
            config.render.corner_radius = v;
        }
        if let Some(v) = render.text_padding_x {
            config.render.text_padding_x = v;
        }
        if let Some(v) = render.start_label {
            config.render.start_label = v;
        }
        if let Some(v) = render.end_label {
            config.render.end_label = v;
        }
        if let Some(v) = render.duration_label {
            config.render.duration_label = v;
        }
    }

    validate_layout(&config.layout)?;
    Ok(config)
}

fn validate_layout(layout: &LayoutConfig) -> anyhow::Result<()> {
    if layout.node_width <= 0.0 || layout.node_height <= 0.0 {
        anyhow::bail!("node size must be positive");
    }
    if layout.column_gap < 0.0 || layout.row_gap < 0.0 {
        anyhow::bail!("gaps must not be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_chart_cells() {
        let config = Config::default();
        assert_eq!(config.layout.node_width + config.layout.column_gap, 140.0);
        assert_eq!(config.layout.node_height + config.layout.row_gap, 85.0);
        assert_eq!(config.render.background, config.theme.background);
    }

    #[test]
    fn overrides_are_applied() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": { "criticalFill": "#ff0000", "fontSize": 12 },
                "layout": { "nodeWidth": 120, "rowGap": 20 },
                "render": { "startLabel": "Début" }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.critical_fill, "#ff0000");
        assert_eq!(config.theme.font_size, 12.0);
        assert_eq!(config.layout.node_width, 120.0);
        assert_eq!(config.layout.row_gap, 20.0);
        assert_eq!(config.layout.column_gap, 30.0);
        assert_eq!(config.render.start_label, "Début");
    }

    #[test]
    fn rejects_bad_geometry_and_unknown_theme() {
        assert!(parse_config(r#"{"layout": {"nodeWidth": 0}}"#).is_err());
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
    }
}
