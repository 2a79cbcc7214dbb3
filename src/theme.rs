use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub link_color: String,
    pub link_opacity: f32,
    pub link_width: f32,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub node_fill: String,
    /// Fill for nodes whose children are shown.
    pub branch_fill: String,
    /// Fill for nodes whose children are hidden.
    pub collapsed_fill: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12.0,
            background: "#f7f7f7".to_string(),
            text_color: "#202124".to_string(),
            link_color: "#9aa0a6".to_string(),
            link_opacity: 0.7,
            link_width: 1.3,
            node_stroke: "#2f2f2f".to_string(),
            node_stroke_width: 1.0,
            node_fill: "#ffffff".to_string(),
            branch_fill: "#f0f7ff".to_string(),
            collapsed_fill: "#ffe9b0".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1C2430".to_string(),
            link_color: "#7A8AA6".to_string(),
            link_opacity: 0.8,
            link_width: 1.2,
            node_stroke: "#3B4A63".to_string(),
            node_stroke_width: 1.2,
            node_fill: "#FFFFFF".to_string(),
            branch_fill: "#EEF2F8".to_string(),
            collapsed_fill: "#F6D98B".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
