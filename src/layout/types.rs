use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A position in layout space: `x` runs along the breadth axis (sibling
/// order), `y` along the depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Generations grow left to right.
    #[default]
    Horizontal,
    /// Generations grow top to bottom.
    Vertical,
}

impl Orientation {
    /// Maps a layout-space point onto screen axes.
    pub fn to_screen(self, point: Point) -> Point {
        match self {
            Orientation::Horizontal => Point::new(point.y, point.x),
            Orientation::Vertical => point,
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" | "lr" => Ok(Self::Horizontal),
            "vertical" | "v" | "td" | "tb" => Ok(Self::Vertical),
            other => Err(format!("unknown orientation `{other}` (expected horizontal or vertical)")),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => f.write_str("horizontal"),
            Orientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// Affine viewport transform: translate by `(x, y)`, then scale by `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    pub fn invert(&self, point: Point) -> Point {
        Point::new((point.x - self.x) / self.k, (point.y - self.y) / self.k)
    }

    pub fn to_svg(&self) -> String {
        format!("translate({:.2},{:.2}) scale({})", self.x, self.y, self.k)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionKind {
    Enter,
    Update,
    Exit,
}

/// Movement of one node during a transition, in layout space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMotion {
    pub id: String,
    pub kind: MotionKind,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Node the pass was triggered from.
    pub source: String,
    pub duration_ms: u32,
    pub motions: Vec<NodeMotion>,
}

impl Transition {
    pub fn of_kind(&self, kind: MotionKind) -> impl Iterator<Item = &NodeMotion> {
        self.motions.iter().filter(move |m| m.kind == kind)
    }

    pub fn entered(&self) -> Vec<&str> {
        self.of_kind(MotionKind::Enter).map(|m| m.id.as_str()).collect()
    }

    pub fn exited(&self) -> Vec<&str> {
        self.of_kind(MotionKind::Exit).map(|m| m.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn of_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// A visible node, positioned in screen space before the viewport transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub position: Point,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLink {
    pub source: String,
    pub target: String,
    pub from: Point,
    pub to: Point,
}

/// Everything a renderer needs to draw the current state of a tree view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub orientation: Orientation,
    pub transform: Transform,
    pub labels_visible: bool,
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
    pub bounds: Option<Bounds>,
}
