use crate::forest::DEFAULT_ROOT_LABEL;
use crate::layout::{Orientation, TidySpacing};
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_INITIAL_DEPTH: usize = 3;

/// What the caller wants to see: which sub-trees, which way up, and how many
/// generations open at first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub selected_root_ids: Vec<String>,
    pub orientation: Orientation,
    pub initial_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            selected_root_ids: Vec::new(),
            orientation: Orientation::Horizontal,
            initial_depth: DEFAULT_INITIAL_DEPTH,
        }
    }
}

impl RenderConfig {
    /// Depth below 1 is raised to 1.
    pub fn effective_depth(&self) -> usize {
        self.initial_depth.max(1)
    }
}

/// Parses free-form depth input. Anything unparsable falls back to
/// [`DEFAULT_INITIAL_DEPTH`]; values below 1 become 1.
pub fn parse_initial_depth(text: &str) -> usize {
    match text.trim().parse::<i64>() {
        Ok(depth) => depth.clamp(1, i64::from(u32::MAX)) as usize,
        Err(_) => DEFAULT_INITIAL_DEPTH,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Distance between adjacent siblings along the breadth axis.
    pub node_breadth: f32,
    /// Distance between generations along the depth axis.
    pub level_spacing: f32,
    pub sibling_separation: f32,
    pub subtree_separation: f32,
    pub node_radius: f32,
    /// Labels sit this far above their node.
    pub label_offset: f32,
    pub transition_ms: u32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Labels are hidden below this zoom factor.
    pub label_zoom_threshold: f32,
    pub viewport_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_breadth: 24.0,
            level_spacing: 210.0,
            sibling_separation: 1.0,
            subtree_separation: 2.0,
            node_radius: 5.5,
            label_offset: 10.0,
            transition_ms: 140,
            min_zoom: 0.08,
            max_zoom: 6.0,
            label_zoom_threshold: 0.45,
            viewport_padding: 60.0,
        }
    }
}

impl LayoutConfig {
    pub fn spacing(&self) -> TidySpacing {
        TidySpacing {
            node_breadth: self.node_breadth,
            level_spacing: self.level_spacing,
            sibling_separation: self.sibling_separation,
            subtree_separation: self.subtree_separation,
        }
    }
}

/// Size of the drawing surface the viewport is centered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 900.0,
            background: "#f7f7f7".to_string(),
        }
    }
}

/// A named shortcut for a sub-tree root, e.g. a clan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanPreset {
    pub label: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub root_label: String,
    pub delete_ids: Vec<String>,
    pub clans: Vec<ClanPreset>,
}

/// Clan roots of the Somali genealogy the tool was first built for. A
/// config file's `clans` list replaces them.
pub const DEFAULT_CLANS: [(&str, &str); 6] = [
    ("Darood", "1"),
    ("Dir", "158"),
    ("Rahanweyn", "651"),
    ("Hawiye", "572"),
    ("Prune", "-1"),
    ("Sheikh Isaaq", "1000"),
];

impl ClanPreset {
    pub fn new(label: &str, id: &str) -> Self {
        Self {
            label: label.to_string(),
            id: id.to_string(),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            delete_ids: Vec::new(),
            clans: DEFAULT_CLANS
                .iter()
                .map(|(label, id)| ClanPreset::new(label, id))
                .collect(),
        }
    }
}

impl TreeConfig {
    /// Maps a preset label (case-insensitive) to its id; anything else is
    /// taken as an id.
    pub fn resolve_clan(&self, token: &str) -> String {
        let token = token.trim();
        self.clans
            .iter()
            .find(|clan| clan.label.eq_ignore_ascii_case(token))
            .map(|clan| clan.id.clone())
            .unwrap_or_else(|| token.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub canvas: CanvasConfig,
    pub tree: TreeConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    node_border: Option<String>,
    node_fill: Option<String>,
    branch_fill: Option<String>,
    collapsed_fill: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_breadth: Option<f32>,
    level_spacing: Option<f32>,
    sibling_separation: Option<f32>,
    subtree_separation: Option<f32>,
    node_radius: Option<f32>,
    label_offset: Option<f32>,
    transition_ms: Option<u32>,
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    label_zoom_threshold: Option<f32>,
    viewport_padding: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    canvas: Option<CanvasConfigFile>,
    root_label: Option<String>,
    delete_ids: Option<Vec<String>>,
    clans: Option<Vec<ClanPreset>>,
}

fn parse_config_file(contents: &str, path: &Path) -> anyhow::Result<ConfigFile> {
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    let parsed = if is_json5 {
        json5::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };
    Ok(parsed)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let parsed = parse_config_file(&contents, path)
        .with_context(|| format!("parsing config {}", path.display()))?;
    apply_config_file(&mut config, parsed)?;
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) -> anyhow::Result<()> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
        config.canvas.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.canvas.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.link_color = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.branch_fill {
            config.theme.branch_fill = v;
        }
        if let Some(v) = vars.collapsed_fill {
            config.theme.collapsed_fill = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.node_breadth {
            target.node_breadth = v;
        }
        if let Some(v) = layout.level_spacing {
            target.level_spacing = v;
        }
        if let Some(v) = layout.sibling_separation {
            target.sibling_separation = v;
        }
        if let Some(v) = layout.subtree_separation {
            target.subtree_separation = v;
        }
        if let Some(v) = layout.node_radius {
            target.node_radius = v;
        }
        if let Some(v) = layout.label_offset {
            target.label_offset = v;
        }
        if let Some(v) = layout.transition_ms {
            target.transition_ms = v;
        }
        if let Some(v) = layout.min_zoom {
            target.min_zoom = v;
        }
        if let Some(v) = layout.max_zoom {
            target.max_zoom = v;
        }
        if let Some(v) = layout.label_zoom_threshold {
            target.label_zoom_threshold = v;
        }
        if let Some(v) = layout.viewport_padding {
            target.viewport_padding = v;
        }
        if target.min_zoom <= 0.0 || target.min_zoom > target.max_zoom {
            anyhow::bail!(
                "invalid zoom extent [{}, {}]",
                target.min_zoom,
                target.max_zoom
            );
        }
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width {
            config.canvas.width = v;
        }
        if let Some(v) = canvas.height {
            config.canvas.height = v;
        }
    }

    if let Some(label) = parsed.root_label {
        config.tree.root_label = label;
    }
    if let Some(ids) = parsed.delete_ids {
        config.tree.delete_ids = ids.into_iter().map(|id| id.trim().to_string()).collect();
    }
    if let Some(clans) = parsed.clans {
        config.tree.clans = clans;
    }
    Ok(())
}
