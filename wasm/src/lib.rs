use lineage_renderer::config::parse_initial_depth;
use lineage_renderer::layout::Point;
use lineage_renderer::{
    Config, Orientation, RenderConfig, Theme, TreeView, build_view, parse_records, render_svg,
};
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineageRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    root_label: Option<String>,
    selected_root_ids: Option<Vec<String>>,
    orientation: Option<String>,
    /// Number or free-form text, as typed into a depth box.
    initial_depth: Option<Value>,
}

fn build_options(options: LineageRenderOptions) -> Result<(RenderConfig, Config), String> {
    let mut config = Config::default();
    if let Some(name) = options.theme.as_deref() {
        config.theme = Theme::by_name(name).ok_or_else(|| format!("unknown theme `{name}`"))?;
        config.canvas.background = config.theme.background.clone();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.canvas.width = width;
    }
    if let Some(height) = options.height {
        config.canvas.height = height;
    }
    if let Some(label) = options.root_label {
        config.tree.root_label = label;
    }

    let mut render = RenderConfig::default();
    if let Some(ids) = options.selected_root_ids {
        render.selected_root_ids = ids;
    }
    if let Some(orientation) = options.orientation.as_deref() {
        render.orientation = orientation.parse::<Orientation>()?;
    }
    if let Some(depth) = options.initial_depth {
        render.initial_depth = match depth {
            Value::String(text) => parse_initial_depth(&text),
            other => parse_initial_depth(&other.to_string()),
        };
    }
    Ok((render, config))
}

fn parse_options(options_json: Option<String>) -> Result<LineageRenderOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(LineageRenderOptions::default()),
    }
}

/// A live tree view driven from JavaScript: clicks, hovers and zooms go in,
/// SVG and JSON come out.
#[wasm_bindgen]
pub struct TreeSession {
    view: TreeView,
    config: Config,
}

impl TreeSession {
    fn open(records_json: &str, options: LineageRenderOptions) -> Result<Self, String> {
        let (render, config) = build_options(options)?;
        let records = parse_records(records_json).map_err(|error| error.to_string())?;
        let (view, _) = build_view(&records, &render, &config).map_err(|error| error.to_string())?;
        Ok(Self { view, config })
    }

    fn toggle_json(&mut self, id: &str) -> Result<String, String> {
        let transition = self.view.toggle(id).map_err(|error| error.to_string())?;
        serde_json::to_string(&transition).map_err(|error| error.to_string())
    }
}

#[wasm_bindgen]
impl TreeSession {
    #[wasm_bindgen(constructor)]
    pub fn new(records_json: &str, options_json: Option<String>) -> Result<TreeSession, JsValue> {
        let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
        Self::open(records_json, options).map_err(|error| JsValue::from_str(&error))
    }

    /// Expands or collapses `id`; returns the transition as JSON.
    pub fn toggle(&mut self, id: &str) -> Result<String, JsValue> {
        self.toggle_json(id).map_err(|error| JsValue::from_str(&error))
    }

    /// Tooltip data for `id` as JSON, or `undefined` for unknown ids.
    pub fn hover(&self, id: &str) -> Option<String> {
        let info = self.view.hover(id)?;
        serde_json::to_string(&info).ok()
    }

    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32) -> Option<String> {
        self.view.node_at(Point::new(x, y)).map(str::to_string)
    }

    pub fn zoom(&mut self, factor: f32, x: f32, y: f32) {
        self.view.zoom_by(factor, Point::new(x, y));
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.view.pan_by(dx, dy);
    }

    pub fn svg(&self) -> String {
        render_svg(
            &self.view.scene(),
            &self.config.theme,
            &self.config.layout,
            &self.config.canvas,
        )
    }

    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.view.scene()).map_err(|error| JsValue::from_str(&error.to_string()))
    }
}

#[wasm_bindgen]
pub fn render_lineage_svg(records_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    let session = TreeSession::open(records_json, options).map_err(|error| JsValue::from_str(&error))?;
    Ok(session.svg())
}

#[cfg(test)]
mod tests {
    use crate::{LineageRenderOptions, TreeSession, build_options, parse_options};

    const RECORDS: &str = r#"[
        {"id": 1, "parentId": null, "name": "Darood"},
        {"id": "2", "parentId": "1", "name": "Marehan"},
        {"id": "3", "parentId": "2", "name": "Sade"},
        {"id": "4", "parentId": "404", "name": "Orphan"}
    ]"#;

    #[test]
    fn session_toggles_and_renders() {
        let options = parse_options(Some(r#"{"initialDepth": "2", "orientation": "vertical"}"#.to_string()))
            .expect("options parse");
        let mut session = TreeSession::open(RECORDS, options).expect("session opens");
        let before = session.svg();
        assert!(before.contains("Marehan"));
        assert!(!before.contains("Sade"));

        let transition = session.toggle_json("2").expect("2 toggles");
        assert!(transition.contains("\"enter\""));
        assert!(session.svg().contains("Sade"));

        let hover = session.hover("3").expect("3 hovers");
        assert!(hover.contains("\"generation\":3"));
        assert!(session.hover("missing").is_none());
    }

    #[test]
    fn numeric_and_invalid_depths() {
        let (render, _) = build_options(LineageRenderOptions {
            initial_depth: Some(serde_json::json!(0)),
            ..LineageRenderOptions::default()
        })
        .unwrap();
        assert_eq!(render.initial_depth, 1);
        let (render, _) = build_options(LineageRenderOptions {
            initial_depth: Some(serde_json::json!("deep")),
            ..LineageRenderOptions::default()
        })
        .unwrap();
        assert_eq!(render.initial_depth, 3);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let options = LineageRenderOptions {
            theme: Some("neon".to_string()),
            ..LineageRenderOptions::default()
        };
        assert!(build_options(options).is_err());
    }
}
