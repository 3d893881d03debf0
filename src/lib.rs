pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
#[cfg(feature = "cli")]
pub mod logging;
pub mod model;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

pub use chart::PertChart;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use interaction::{DragOutcome, InteractionController, InteractionState};
pub use ir::{Dependency, NodeKind, TaskGraph, TaskGraphProvider, TaskId, TaskRecord};
pub use layout::{LayoutError, PertLayout, compute_layout};
pub use model::GraphModel;
pub use parser::{ParseError, parse_task_graph};
