use crate::chart::PertChart;
use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::logging::init_logging;
use crate::parser::parse_task_graph;
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pert", version, about = "Lay out and render PERT charts of task graphs")]
pub struct Args {
    /// Input task graph (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, layout and render overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Also write the computed layout as JSON to this file
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (overrides PERT_LOG)
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level)?;
    let config = load_config(args.config.as_deref()).context("failed to load config")?;

    let input = read_input(args.input.as_deref())?;
    let graph = parse_task_graph(&input)?;

    let mut chart = PertChart::new(config.layout.clone());
    if let Err(err) = chart.rebuild(&graph) {
        warn!(error = %err, "rendering tasks as a plain list");
    }
    let layout = chart.layout();
    info!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        columns = layout.columns,
        "layout ready"
    );

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write layout dump to {}", path.display()))?;
    }

    let svg = render_svg(&layout, &config.theme, &config.render);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config.theme)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, theme: &crate::theme::Theme) -> Result<()> {
    crate::render::write_output_png(svg, output, theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _theme: &crate::theme::Theme) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "pert",
            "-i",
            "house.json",
            "-e",
            "png",
            "-o",
            "house.png",
            "--dump-layout",
            "layout.json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("house.json")));
        assert_eq!(args.output_format, OutputFormat::Png);
        assert_eq!(args.dump_layout, Some(PathBuf::from("layout.json")));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("a.png")), "png").unwrap(),
            PathBuf::from("a.png")
        );
    }
}
