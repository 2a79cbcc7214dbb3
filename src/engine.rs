//! Interactive tree view: expand/collapse state, incremental re-layout,
//! transitions, and the viewport.
//!
//! All state changes happen synchronously inside the method that causes
//! them; animating a [`Transition`] is left to whoever draws it.

use crate::config::{CanvasConfig, LayoutConfig, RenderConfig};
use crate::error::{Error, Result};
use crate::hierarchy::Hierarchy;
use crate::layout::{
    Bounds, MotionKind, NodeMotion, Orientation, Point, Scene, SceneLink, SceneNode, Transform,
    Transition, tidy_layout,
};
use serde::Serialize;

/// What hovering a node reveals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverInfo {
    pub title: String,
    pub id: String,
    pub generation: usize,
    pub parent: Option<String>,
    pub child_count: usize,
    pub collapsed: bool,
}

impl HoverInfo {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.title.clone(),
            format!("ID: {}", self.id),
            format!("Generation: {}", self.generation),
        ];
        if let Some(parent) = &self.parent {
            lines.push(format!("Parent: {parent}"));
        }
        lines
    }
}

#[derive(Debug, Clone)]
pub struct TreeView {
    tree: Hierarchy,
    orientation: Orientation,
    layout: LayoutConfig,
    canvas: CanvasConfig,
    transform: Transform,
    initial_transform: Option<Transform>,
    passes: usize,
}

impl TreeView {
    /// Takes ownership of `tree`, opens the first `initial_depth` generations
    /// and runs the first layout pass, which also centers the viewport.
    pub fn new(
        tree: Hierarchy,
        render: &RenderConfig,
        layout: LayoutConfig,
        canvas: CanvasConfig,
    ) -> Self {
        let mut view = Self {
            tree,
            orientation: render.orientation,
            layout,
            canvas,
            transform: Transform::IDENTITY,
            initial_transform: None,
            passes: 0,
        };
        let depth = render.effective_depth();
        for node in view.tree.nodes_mut() {
            node.expanded = node.depth < depth;
        }
        let root = view.tree.root();
        view.relayout(root);
        view
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// The auto-centering transform computed by the first layout pass.
    pub fn initial_transform(&self) -> Option<Transform> {
        self.initial_transform
    }

    pub fn layout_passes(&self) -> usize {
        self.passes
    }

    pub fn is_expanded(&self, id: &str) -> Option<bool> {
        self.tree.node(id).map(|n| n.expanded)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.tree.node(id).is_some_and(|n| n.visible)
    }

    /// Ids of visible nodes in pre-order.
    pub fn visible_ids(&self) -> Vec<&str> {
        self.tree
            .preorder(self.tree.root())
            .into_iter()
            .filter_map(|idx| self.tree.get(idx))
            .filter(|n| n.visible)
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Flips the node's expanded flag and re-lays out from it.
    pub fn toggle(&mut self, id: &str) -> Result<Transition> {
        let idx = self
            .tree
            .index_of(id)
            .ok_or_else(|| Error::NodeNotFound { id: id.to_string() })?;
        if let Some(node) = self.tree.get_mut(idx) {
            node.expanded = !node.expanded;
            tracing::debug!(id, expanded = node.expanded, "toggled node");
        }
        Ok(self.relayout(idx))
    }

    /// Read-only; unknown ids yield `None`.
    pub fn hover(&self, id: &str) -> Option<HoverInfo> {
        let idx = self.tree.index_of(id)?;
        let node = self.tree.get(idx)?;
        Some(HoverInfo {
            title: node.label().to_string(),
            id: node.id.clone(),
            generation: node.depth,
            parent: self.tree.parent(idx).map(|p| p.label().to_string()),
            child_count: node.children.len(),
            collapsed: node.is_collapsed(),
        })
    }

    /// Hit test in screen coordinates (after the viewport transform).
    pub fn node_at(&self, screen: Point) -> Option<&str> {
        let local = self.transform.invert(screen);
        let reach = self.layout.node_radius + 2.0;
        self.tree
            .iter()
            .filter(|(_, n)| n.visible)
            .filter_map(|(_, n)| Some((n, self.orientation.to_screen(n.position?))))
            .find(|(_, p)| (p.x - local.x).abs() <= reach && (p.y - local.y).abs() <= reach)
            .map(|(n, _)| n.id.as_str())
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = Transform {
            k: self.clamp_zoom(transform.k),
            ..transform
        };
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Scales around `focal` (screen coordinates), keeping that point fixed.
    pub fn zoom_by(&mut self, factor: f32, focal: Point) {
        let k = self.clamp_zoom(self.transform.k * factor);
        let anchor = self.transform.invert(focal);
        self.transform = Transform {
            x: focal.x - anchor.x * k,
            y: focal.y - anchor.y * k,
            k,
        };
    }

    pub fn labels_visible(&self) -> bool {
        self.transform.k >= self.layout.label_zoom_threshold
    }

    fn clamp_zoom(&self, k: f32) -> f32 {
        k.clamp(self.layout.min_zoom, self.layout.max_zoom)
    }

    fn update_visibility(&mut self) -> usize {
        let root = self.tree.root();
        let nodes = self.tree.nodes_mut();
        for node in nodes.iter_mut() {
            node.visible = false;
        }
        let mut stack = vec![root];
        let mut count = 0;
        while let Some(idx) = stack.pop() {
            nodes[idx].visible = true;
            count += 1;
            if nodes[idx].expanded {
                stack.extend(nodes[idx].children.iter().copied());
            }
        }
        count
    }

    /// One layout pass triggered from `source`.
    fn relayout(&mut self, source: usize) -> Transition {
        let visible = self.update_visibility();
        let fresh = tidy_layout(&self.tree, &self.layout.spacing());

        let (source_id, source_old) = match self.tree.get(source) {
            Some(node) => (node.id.clone(), node.position),
            None => (String::new(), None),
        };
        // Entering nodes grow out of where the source was drawn until now.
        let enter_from = source_old.unwrap_or(Point::ORIGIN);
        let exit_to = fresh
            .get(source)
            .copied()
            .flatten()
            .or(source_old)
            .unwrap_or(Point::ORIGIN);

        let mut motions = Vec::new();
        for (node, new) in self.tree.nodes_mut().iter_mut().zip(fresh) {
            let old = node.position;
            match (old, new) {
                (None, Some(to)) => motions.push(NodeMotion {
                    id: node.id.clone(),
                    kind: MotionKind::Enter,
                    from: enter_from,
                    to,
                }),
                (Some(from), Some(to)) if from != to => motions.push(NodeMotion {
                    id: node.id.clone(),
                    kind: MotionKind::Update,
                    from,
                    to,
                }),
                (Some(from), None) => motions.push(NodeMotion {
                    id: node.id.clone(),
                    kind: MotionKind::Exit,
                    from,
                    to: exit_to,
                }),
                _ => {}
            }
            node.previous_position = old;
            node.position = new;
        }

        if self.initial_transform.is_none() {
            let centered = self.center_transform();
            self.initial_transform = Some(centered);
            self.transform = centered;
        }
        self.passes += 1;
        tracing::debug!(
            source = %source_id,
            visible,
            moved = motions.len(),
            pass = self.passes,
            "layout pass"
        );

        Transition {
            source: source_id,
            duration_ms: self.layout.transition_ms,
            motions,
        }
    }

    /// Left-pads the tree and centers it vertically on the canvas.
    fn center_transform(&self) -> Transform {
        let screen_y = self
            .tree
            .iter()
            .filter_map(|(_, n)| n.position)
            .map(|p| self.orientation.to_screen(p).y);
        let (min_a, max_a) = screen_y.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
        if !min_a.is_finite() {
            return Transform::IDENTITY;
        }
        Transform {
            x: self.layout.viewport_padding,
            y: (self.canvas.height - (max_a - min_a)) / 2.0 - min_a,
            k: 1.0,
        }
    }

    /// Snapshot of what is currently visible, in pre-order.
    pub fn scene(&self) -> Scene {
        let mut nodes = Vec::new();
        let mut links = Vec::new();
        for idx in self.tree.preorder(self.tree.root()) {
            let Some(node) = self.tree.get(idx) else {
                continue;
            };
            let Some(position) = node.position else {
                continue;
            };
            let screen = self.orientation.to_screen(position);
            let tooltip = self
                .hover(&node.id)
                .map(|info| info.lines().join("\n"))
                .unwrap_or_default();
            nodes.push(SceneNode {
                id: node.id.clone(),
                label: node.label().to_string(),
                position: screen,
                depth: node.depth,
                has_children: node.has_children(),
                collapsed: node.is_collapsed(),
                tooltip,
            });
            if let Some(parent) = self.tree.parent(idx)
                && let Some(parent_position) = parent.position
            {
                links.push(SceneLink {
                    source: parent.id.clone(),
                    target: node.id.clone(),
                    from: self.orientation.to_screen(parent_position),
                    to: screen,
                });
            }
        }
        let bounds = Bounds::of_points(nodes.iter().map(|n| n.position));
        Scene {
            orientation: self.orientation,
            transform: self.transform,
            labels_visible: self.labels_visible(),
            nodes,
            links,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Node;

    /// r -> a -> b -> c -> d, plus r -> x
    fn chain_view(depth: usize, orientation: Orientation) -> TreeView {
        let nodes = vec![
            Node::new("r", None, "Root"),
            Node::new("a", Some("r"), "A"),
            Node::new("b", Some("a"), "B"),
            Node::new("c", Some("b"), "C"),
            Node::new("d", Some("c"), "D"),
            Node::new("d2", Some("c"), ""),
            Node::new("e", Some("d"), "E"),
            Node::new("x", Some("r"), "X"),
        ];
        let tree = Hierarchy::build(&nodes).expect("valid tree");
        let render = RenderConfig {
            initial_depth: depth,
            orientation,
            ..RenderConfig::default()
        };
        TreeView::new(tree, &render, LayoutConfig::default(), CanvasConfig::default())
    }

    #[test]
    fn initial_depth_controls_expansion() {
        let view = chain_view(2, Orientation::Horizontal);
        assert_eq!(view.is_expanded("r"), Some(true));
        assert_eq!(view.is_expanded("a"), Some(true));
        assert_eq!(view.is_expanded("b"), Some(false));
        assert_eq!(view.is_expanded("c"), Some(false));
        assert_eq!(view.visible_ids(), ["r", "a", "b", "x"]);
    }

    #[test]
    fn expanding_reveals_only_direct_children() {
        let mut view = chain_view(2, Orientation::Horizontal);
        view.toggle("b").unwrap();
        assert!(view.is_visible("c"));
        assert!(!view.is_visible("d"));
        let transition = view.toggle("c").unwrap();
        assert_eq!(view.is_expanded("c"), Some(true));
        assert_eq!(transition.entered(), ["d", "d2"]);
        assert!(!view.is_visible("e"));
    }

    #[test]
    fn collapse_keeps_descendant_state() {
        let mut view = chain_view(5, Orientation::Horizontal);
        assert!(view.is_visible("e"));
        view.toggle("d").unwrap();
        assert!(!view.is_visible("e"));
        let transition = view.toggle("b").unwrap();
        assert_eq!(transition.exited(), ["c", "d", "d2"]);
        view.toggle("b").unwrap();
        assert_eq!(view.is_expanded("d"), Some(false));
        assert!(view.is_visible("d"));
        assert!(!view.is_visible("e"));
    }

    #[test]
    fn entering_nodes_start_from_source_previous_position() {
        let mut view = chain_view(2, Orientation::Horizontal);
        let b_before = view.tree().node("b").and_then(|n| n.position).unwrap();
        let transition = view.toggle("b").unwrap();
        let enter = transition
            .of_kind(MotionKind::Enter)
            .next()
            .expect("c enters");
        assert_eq!(enter.id, "c");
        let b = view.tree().node("b").unwrap();
        assert_eq!(b.previous_position, Some(b_before));
        assert_eq!(enter.from, b.previous_position.unwrap());
        assert_eq!(Some(enter.to), view.tree().node("c").unwrap().position);
        assert_eq!(transition.duration_ms, 140);
    }

    #[test]
    fn exiting_nodes_move_to_source() {
        let mut view = chain_view(4, Orientation::Vertical);
        let transition = view.toggle("c").unwrap();
        let c_now = view.tree().node("c").unwrap().position.unwrap();
        let exits: Vec<&NodeMotion> = transition.of_kind(MotionKind::Exit).collect();
        assert_eq!(exits.len(), 2);
        assert!(exits.iter().all(|m| m.to == c_now));
        assert!(view.tree().node("d").unwrap().position.is_none());
    }

    #[test]
    fn viewport_is_centered_once() {
        let mut view = chain_view(2, Orientation::Horizontal);
        let first = view.initial_transform().expect("centered on first pass");
        assert_eq!(first.x, 60.0);
        assert_eq!(first.k, 1.0);
        assert_eq!(view.transform(), first);
        view.toggle("b").unwrap();
        view.toggle("r").unwrap();
        assert_eq!(view.transform(), first);
        assert_eq!(view.initial_transform(), Some(first));
        assert_eq!(view.layout_passes(), 3);
    }

    #[test]
    fn centering_uses_screen_vertical_extent() {
        let view = chain_view(1, Orientation::Horizontal);
        // r at breadth 0 with children a (-12) and x (+12) on screen y.
        let t = view.transform();
        assert_eq!(t.y, (900.0 - 24.0) / 2.0 + 12.0);
    }

    #[test]
    fn hover_reports_parent_and_generation() {
        let view = chain_view(3, Orientation::Horizontal);
        let info = view.hover("d2").expect("d2 exists");
        assert_eq!(info.title, "d2");
        assert_eq!(info.generation, 4);
        assert_eq!(info.parent.as_deref(), Some("C"));
        assert!(view.hover("missing").is_none());
        let root = view.hover("r").unwrap();
        assert_eq!(root.parent, None);
        assert_eq!(root.lines().len(), 3);
    }

    #[test]
    fn toggle_unknown_id_fails() {
        let mut view = chain_view(2, Orientation::Horizontal);
        assert!(matches!(view.toggle("nope"), Err(Error::NodeNotFound { .. })));
    }

    #[test]
    fn zoom_is_clamped_and_hides_labels() {
        let mut view = chain_view(2, Orientation::Horizontal);
        assert!(view.labels_visible());
        view.zoom_by(0.4, Point::new(100.0, 100.0));
        assert!(!view.labels_visible());
        view.zoom_by(0.001, Point::ORIGIN);
        assert_eq!(view.transform().k, 0.08);
        view.set_transform(Transform { x: 0.0, y: 0.0, k: 50.0 });
        assert_eq!(view.transform().k, 6.0);
        assert_eq!(view.visible_ids().len(), 4);
    }

    #[test]
    fn zoom_keeps_focal_point_fixed() {
        let mut view = chain_view(2, Orientation::Horizontal);
        let focal = Point::new(300.0, 200.0);
        let before = view.transform().invert(focal);
        view.zoom_by(2.0, focal);
        let after = view.transform().invert(focal);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn scene_lists_visible_nodes_and_links() {
        let view = chain_view(2, Orientation::Vertical);
        let scene = view.scene();
        assert_eq!(scene.nodes.len(), 4);
        assert_eq!(scene.links.len(), 3);
        let b = scene.nodes.iter().find(|n| n.id == "b").unwrap();
        assert!(b.collapsed);
        assert!(b.has_children);
        assert_eq!(b.position.y, 2.0 * 210.0);
        assert!(b.tooltip.contains("Generation: 2"));
    }

    #[test]
    fn node_at_hits_visible_nodes() {
        let view = chain_view(2, Orientation::Horizontal);
        let root = view.tree().node("r").unwrap().position.unwrap();
        let screen = view.transform().apply(view.orientation().to_screen(root));
        assert_eq!(view.node_at(screen), Some("r"));
        assert_eq!(view.node_at(Point::new(-5000.0, -5000.0)), None);
    }
}
