//! Joins a cleaned forest into one tree under a synthetic super-root, and
//! optionally prunes it to the sub-trees a caller selected.

use crate::ir::Node;
use std::collections::{HashMap, HashSet};

/// Id of the synthetic super-root. Normalized ids are always trimmed, so an
/// id with leading whitespace can never collide with a data id.
pub const SUPER_ROOT_ID: &str = " root";

pub const DEFAULT_ROOT_LABEL: &str = "Family Tree";

fn super_root(label: &str) -> Node {
    Node::new(SUPER_ROOT_ID, None, label)
}

/// Points every parentless node at the super-root and appends it.
pub fn attach_super_root(mut nodes: Vec<Node>, root_label: &str) -> Vec<Node> {
    for node in nodes.iter_mut() {
        if node.parent_id.is_none() {
            node.parent_id = Some(SUPER_ROOT_ID.to_string());
        }
    }
    nodes.push(super_root(root_label));
    nodes
}

/// Keeps the union of the selected sub-trees. Kept nodes whose parent was
/// pruned hang directly off the super-root, so the result is still one tree.
///
/// `nodes` is expected to be the output of [`attach_super_root`].
pub fn filter_to_subtrees(nodes: &[Node], selected_root_ids: &[String], root_label: &str) -> Vec<Node> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut known: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        known.insert(node.id.as_str());
        if let Some(parent) = node.parent_id.as_deref() {
            children.entry(parent).or_default().push(node.id.as_str());
        }
    }

    let mut keep: HashSet<&str> = HashSet::new();
    keep.insert(SUPER_ROOT_ID);
    let mut stack: Vec<&str> = Vec::new();
    for selected in selected_root_ids {
        if known.contains(selected.as_str()) {
            stack.push(selected.as_str());
        } else {
            tracing::warn!(id = %selected, "selected root id not found; ignoring");
        }
    }
    while let Some(current) = stack.pop() {
        if !keep.insert(current) {
            continue;
        }
        if let Some(kids) = children.get(current) {
            stack.extend(kids.iter().copied());
        }
    }

    let mut out: Vec<Node> = nodes
        .iter()
        .filter(|n| n.id != SUPER_ROOT_ID && keep.contains(n.id.as_str()))
        .map(|n| {
            let parent_kept = n
                .parent_id
                .as_deref()
                .is_some_and(|p| keep.contains(p));
            Node {
                id: n.id.clone(),
                parent_id: Some(if parent_kept {
                    n.parent_id.clone().unwrap_or_default()
                } else {
                    SUPER_ROOT_ID.to_string()
                }),
                name: n.name.clone(),
            }
        })
        .collect();
    out.push(super_root(root_label));
    tracing::debug!(kept = out.len(), selected = selected_root_ids.len(), "filtered sub-trees");
    out
}

/// Attaches the super-root, then prunes to `selected_root_ids` when any are
/// given.
pub fn adapt(nodes: Vec<Node>, selected_root_ids: &[String], root_label: &str) -> Vec<Node> {
    let rooted = attach_super_root(nodes, root_label);
    if selected_root_ids.is_empty() {
        rooted
    } else {
        filter_to_subtrees(&rooted, selected_root_ids, root_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(nodes: &[Node]) -> Vec<&str> {
        nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.id.as_str())
            .collect()
    }

    #[test]
    fn forest_gets_single_root() {
        let nodes = vec![
            Node::new("1", None, "Darood"),
            Node::new("2", Some("1"), "Kablalah"),
            Node::new("158", None, "Dir"),
        ];
        let out = adapt(nodes, &[], DEFAULT_ROOT_LABEL);
        assert_eq!(roots(&out), [SUPER_ROOT_ID]);
        assert_eq!(out[0].parent_id.as_deref(), Some(SUPER_ROOT_ID));
        assert_eq!(out[1].parent_id.as_deref(), Some("1"));
        assert_eq!(out[2].parent_id.as_deref(), Some(SUPER_ROOT_ID));
        assert_eq!(out.last().map(|n| n.name.as_str()), Some(DEFAULT_ROOT_LABEL));
    }

    #[test]
    fn selecting_middle_of_chain_reparents_to_root() {
        let nodes = vec![
            Node::new("A", None, "A"),
            Node::new("B", Some("A"), "B"),
            Node::new("C", Some("B"), "C"),
        ];
        let out = adapt(nodes, &["B".to_string()], "Top");
        assert_eq!(
            out,
            vec![
                Node::new("B", Some(SUPER_ROOT_ID), "B"),
                Node::new("C", Some("B"), "C"),
                Node::new(SUPER_ROOT_ID, None, "Top"),
            ]
        );
    }

    #[test]
    fn overlapping_selections_are_unioned() {
        let nodes = vec![
            Node::new("1", None, ""),
            Node::new("2", Some("1"), ""),
            Node::new("3", Some("2"), ""),
            Node::new("4", None, ""),
        ];
        let out = adapt(
            nodes,
            &["1".to_string(), "2".to_string(), "missing".to_string()],
            "Top",
        );
        let ids: Vec<&str> = out.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", SUPER_ROOT_ID]);
        assert_eq!(out[1].parent_id.as_deref(), Some("1"));
        assert_eq!(roots(&out), [SUPER_ROOT_ID]);
    }
}
