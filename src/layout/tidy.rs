//! Tidy tree placement over the visible part of a hierarchy.
//!
//! Each subtree is placed bottom-up: children are packed left to right so
//! that their contours keep the configured separation on every level, then
//! the parent is centered over its first and last child. A second, top-down
//! pass turns the relative offsets into absolute breadth coordinates.
//!
//! Both passes are iterative, so a chain of many thousand generations does
//! not recurse.

use super::*;

/// Spacing for [`tidy_layout`]. Separations are in units of `node_breadth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidySpacing {
    pub node_breadth: f32,
    pub level_spacing: f32,
    pub sibling_separation: f32,
    pub subtree_separation: f32,
}

impl Default for TidySpacing {
    fn default() -> Self {
        Self {
            node_breadth: 24.0,
            level_spacing: 210.0,
            sibling_separation: 1.0,
            subtree_separation: 2.0,
        }
    }
}

/// Left and right extent of a subtree on each level. Levels are stored
/// deepest first so a parent level is a push; the true extent of an entry is
/// the stored value plus `offset`, which makes shifting a subtree O(1).
#[derive(Debug, Clone, Default)]
struct Contour {
    levels: Vec<(f32, f32)>,
    offset: f32,
}

impl Contour {
    fn leaf() -> Self {
        Self {
            levels: vec![(0.0, 0.0)],
            offset: 0.0,
        }
    }

    /// Extent of `level` counted from the subtree root.
    fn at(&self, level: usize) -> (f32, f32) {
        let (l, r) = self.levels[self.levels.len() - 1 - level];
        (l + self.offset, r + self.offset)
    }

    /// Smallest shift of `right` that keeps it clear of `self` on every
    /// shared level.
    fn clearance(&self, right: &Contour, spacing: &TidySpacing) -> f32 {
        let shared = self.levels.len().min(right.levels.len());
        let mut shift = f32::MIN;
        for level in 0..shared {
            let gap = if level == 0 {
                spacing.sibling_separation
            } else {
                spacing.subtree_separation
            };
            shift = shift.max(self.at(level).1 + gap - right.at(level).0);
        }
        shift
    }

    /// Unions `other`, shifted by `shift`, into this contour. The longer
    /// vector is reused, so each merge costs the shorter depth.
    fn absorb(&mut self, mut other: Contour, shift: f32) {
        other.offset += shift;
        if other.levels.len() > self.levels.len() {
            std::mem::swap(self, &mut other);
        }
        let shared = other.levels.len();
        let self_len = self.levels.len();
        for level in 0..shared {
            let (l, r) = other.at(level);
            let entry = &mut self.levels[self_len - 1 - level];
            entry.0 = entry.0.min(l - self.offset);
            entry.1 = entry.1.max(r - self.offset);
        }
    }

    fn push_root(&mut self) {
        self.levels.push((-self.offset, -self.offset));
    }
}

fn visible_children(tree: &Hierarchy, idx: usize) -> &[usize] {
    match tree.get(idx) {
        Some(node) if node.expanded => &node.children,
        _ => &[],
    }
}

/// Positions every node reachable from the root through expanded nodes.
/// Entries for hidden nodes are `None`.
pub fn tidy_layout(tree: &Hierarchy, spacing: &TidySpacing) -> Vec<Option<Point>> {
    let mut order: Vec<usize> = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(current) = stack.pop() {
        order.push(current);
        stack.extend(visible_children(tree, current).iter().rev().copied());
    }

    let mut contours: Vec<Option<Contour>> = vec![None; tree.len()];
    let mut relative: Vec<f32> = vec![0.0; tree.len()];

    for &v in order.iter().rev() {
        let kids = visible_children(tree, v);
        let Some((&first, rest)) = kids.split_first() else {
            contours[v] = Some(Contour::leaf());
            continue;
        };

        let mut merged = contours[first].take().unwrap_or_else(Contour::leaf);
        let mut offsets = Vec::with_capacity(kids.len());
        offsets.push(0.0f32);
        for &kid in rest {
            let contour = contours[kid].take().unwrap_or_else(Contour::leaf);
            let shift = merged.clearance(&contour, spacing);
            merged.absorb(contour, shift);
            offsets.push(shift);
        }

        let center = (offsets[0] + offsets[offsets.len() - 1]) / 2.0;
        for (&kid, offset) in kids.iter().zip(&offsets) {
            relative[kid] = offset - center;
        }
        merged.offset -= center;
        merged.push_root();
        contours[v] = Some(merged);
    }

    let mut breadth: Vec<f32> = vec![0.0; tree.len()];
    let mut positions: Vec<Option<Point>> = vec![None; tree.len()];
    for &v in &order {
        let depth = tree.get(v).map(|n| n.depth).unwrap_or(0);
        positions[v] = Some(Point::new(
            breadth[v] * spacing.node_breadth,
            depth as f32 * spacing.level_spacing,
        ));
        for &kid in visible_children(tree, v) {
            breadth[kid] = breadth[v] + relative[kid];
        }
    }
    positions
}
