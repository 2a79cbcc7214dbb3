//! Arena-backed rooted tree built from a single-root node list.

use crate::error::{Error, Result};
use crate::ir::Node;
use crate::layout::Point;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub parent: Option<usize>,
    /// Arena indices, in input order.
    pub children: Vec<usize>,
    pub depth: usize,
    pub expanded: bool,
    pub visible: bool,
    pub position: Option<Point>,
    pub previous_position: Option<Point>,
}

impl TreeNode {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Children exist but are hidden.
    pub fn is_collapsed(&self) -> bool {
        self.has_children() && !self.expanded
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<TreeNode>,
    index: HashMap<String, usize>,
    root: usize,
}

impl Hierarchy {
    /// Builds the tree. Every failure here means the repair pipeline let a
    /// defect through, so nothing is guessed: the build aborts.
    pub fn build(nodes: &[Node]) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
        let mut arena: Vec<TreeNode> = Vec::with_capacity(nodes.len());
        let mut roots: Vec<usize> = Vec::new();

        for (idx, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), idx).is_some() {
                return Err(Error::DuplicateId {
                    id: node.id.clone(),
                });
            }
            if node.parent_id.is_none() {
                roots.push(idx);
            }
            arena.push(TreeNode {
                id: node.id.clone(),
                name: node.name.clone(),
                parent: None,
                children: Vec::new(),
                depth: 0,
                expanded: false,
                visible: false,
                position: None,
                previous_position: None,
            });
        }

        let root = match roots.as_slice() {
            [] => return Err(Error::NoRoot),
            [root] => *root,
            many => {
                return Err(Error::MultipleRoots {
                    ids: many.iter().map(|&i| nodes[i].id.clone()).collect(),
                });
            }
        };

        for (idx, node) in nodes.iter().enumerate() {
            let Some(parent_id) = node.parent_id.as_deref() else {
                continue;
            };
            let Some(&parent) = index.get(parent_id) else {
                return Err(Error::MissingParent {
                    id: node.id.clone(),
                    parent: parent_id.to_string(),
                });
            };
            arena[idx].parent = Some(parent);
            arena[parent].children.push(idx);
        }

        let mut reached = 0usize;
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            reached += 1;
            let depth = arena[current].depth;
            for pos in 0..arena[current].children.len() {
                let child = arena[current].children[pos];
                arena[child].depth = depth + 1;
                queue.push_back(child);
            }
        }
        if reached != arena.len() {
            return Err(Error::Unreachable {
                count: arena.len() - reached,
            });
        }

        Ok(Self {
            nodes: arena,
            index,
            root,
        })
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&TreeNode> {
        self.nodes.get(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut TreeNode> {
        self.nodes.get_mut(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn parent(&self, idx: usize) -> Option<&TreeNode> {
        self.nodes.get(idx)?.parent.map(|p| &self.nodes[p])
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        self.nodes
            .get(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TreeNode)> {
        self.nodes.iter().enumerate()
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TreeNode] {
        &mut self.nodes
    }

    /// Pre-order walk from `start`, children in order.
    pub fn preorder(&self, start: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        order
    }
}
