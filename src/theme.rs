use serde::{Deserialize, Serialize};

use crate::ir::NodeKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub normal_border: String,
    pub super_border: String,
    pub milestone_border: String,
    pub node_fill: String,
    pub critical_fill: String,
    pub text_color: String,
    pub arrow_color: String,
    pub background: String,
}

impl Theme {
    /// Colors of the classic desktop PERT chart.
    pub fn classic() -> Self {
        Self {
            font_family: "Dialog, Arial, sans-serif".to_string(),
            font_size: 11.0,
            normal_border: "#0000FF".to_string(),
            super_border: "#FF0000".to_string(),
            milestone_border: "#000000".to_string(),
            node_fill: "#E6E6E6".to_string(),
            critical_fill: "#FFFFA4".to_string(),
            text_color: "#000000".to_string(),
            arrow_color: "#808080".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            normal_border: "#3B82F6".to_string(),
            super_border: "#EF4444".to_string(),
            milestone_border: "#1C2430".to_string(),
            node_fill: "#F8FAFF".to_string(),
            critical_fill: "#FEF3C7".to_string(),
            text_color: "#1C2430".to_string(),
            arrow_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn border_for(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Normal => &self.normal_border,
            NodeKind::Super => &self.super_border,
            NodeKind::Milestone => &self.milestone_border,
        }
    }

    pub fn fill_for(&self, critical: bool) -> &str {
        if critical {
            &self.critical_fill
        } else {
            &self.node_fill
        }
    }
}
