use crate::clean::CleanReport;
use crate::layout::{MotionKind, Scene, Transition};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub orientation: String,
    pub transform: [f32; 3],
    pub labels_visible: bool,
    /// Extent of the visible node centers, zero when nothing is visible.
    pub width: f32,
    pub height: f32,
    pub bounds: Option<[f32; 4]>,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CleanReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub points: [[f32; 2]; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDump {
    pub source: String,
    pub duration_ms: u32,
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

impl TransitionDump {
    pub fn from_transition(transition: &Transition) -> Self {
        Self {
            source: transition.source.clone(),
            duration_ms: transition.duration_ms,
            entered: transition.of_kind(MotionKind::Enter).count(),
            updated: transition.of_kind(MotionKind::Update).count(),
            exited: transition.of_kind(MotionKind::Exit).count(),
        }
    }
}

impl LayoutDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let nodes = scene
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.position.x,
                y: node.position.y,
                depth: node.depth,
                has_children: node.has_children,
                collapsed: node.collapsed,
            })
            .collect();

        let links = scene
            .links
            .iter()
            .map(|link| LinkDump {
                source: link.source.clone(),
                target: link.target.clone(),
                points: [[link.from.x, link.from.y], [link.to.x, link.to.y]],
            })
            .collect();

        LayoutDump {
            orientation: scene.orientation.to_string(),
            transform: [scene.transform.x, scene.transform.y, scene.transform.k],
            labels_visible: scene.labels_visible,
            width: scene.bounds.map(|b| b.width()).unwrap_or(0.0),
            height: scene.bounds.map(|b| b.height()).unwrap_or(0.0),
            bounds: scene
                .bounds
                .map(|b| [b.min_x, b.min_y, b.max_x, b.max_y]),
            nodes,
            links,
            transitions: Vec::new(),
            report: None,
        }
    }

    pub fn with_transitions(mut self, transitions: &[Transition]) -> Self {
        self.transitions = transitions.iter().map(TransitionDump::from_transition).collect();
        self
    }

    pub fn with_report(mut self, report: CleanReport) -> Self {
        self.report = Some(report);
        self
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_layout_dump(dump: &LayoutDump, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writer.flush()?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(dump)?);
        }
    }
    Ok(())
}
