use super::*;

fn children_index(nodes: &[Node]) -> HashMap<&str, Vec<&str>> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id.as_deref() {
            children.entry(parent).or_default().push(node.id.as_str());
        }
    }
    children
}

/// Ids of `roots` plus every descendant reachable through child links.
/// Roots that are not present in `nodes` are ignored.
pub fn descendant_closure(nodes: &[Node], roots: &BTreeSet<String>) -> HashSet<String> {
    let present: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let children = children_index(nodes);
    let mut closure: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<&str> = roots
        .iter()
        .map(String::as_str)
        .filter(|id| present.contains(id))
        .collect();

    while let Some(current) = queue.pop_front() {
        if !closure.insert(current.to_string()) {
            continue;
        }
        if let Some(kids) = children.get(current) {
            queue.extend(kids.iter().copied());
        }
    }
    closure
}

/// Removes every id in `delete_ids` together with all of its descendants.
/// Returns the number of nodes removed.
pub fn cascade_delete(nodes: &mut Vec<Node>, delete_ids: &BTreeSet<String>) -> usize {
    if delete_ids.is_empty() {
        return 0;
    }
    let doomed = descendant_closure(nodes, delete_ids);
    if doomed.is_empty() {
        return 0;
    }
    let before = nodes.len();
    nodes.retain(|n| !doomed.contains(&n.id));
    let removed = before - nodes.len();
    tracing::debug!(removed, requested = delete_ids.len(), "cascade delete");
    removed
}

/// Turns nodes whose parent does not exist into roots.
pub fn fix_dangling_parents(nodes: &mut [Node]) -> usize {
    let ids: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let mut fixed = 0;
    for node in nodes.iter_mut() {
        if node.parent_id.as_ref().is_some_and(|p| !ids.contains(p)) {
            node.parent_id = None;
            fixed += 1;
        }
    }
    tracing::debug!(fixed, "dangling parents");
    fixed
}

pub fn fix_self_parents(nodes: &mut [Node]) -> usize {
    let mut fixed = 0;
    for node in nodes.iter_mut() {
        if node.parent_id.as_deref() == Some(node.id.as_str()) {
            node.parent_id = None;
            fixed += 1;
        }
    }
    tracing::debug!(fixed, "self parents");
    fixed
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath(usize),
    Done,
}

/// Breaks parent chains that loop back on themselves. In each cycle the
/// member appearing first in `nodes` loses its parent. Returns the number of
/// cycles broken.
pub fn break_cycles(nodes: &mut [Node]) -> usize {
    let slots: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, n)| (n.id.as_str(), idx))
        .collect();
    let parent_slot: Vec<Option<usize>> = nodes
        .iter()
        .map(|n| n.parent_id.as_deref().and_then(|p| slots.get(p).copied()))
        .collect();

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut cut: Vec<usize> = Vec::new();
    let mut path: Vec<usize> = Vec::new();

    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        path.clear();
        let mut cursor = Some(start);
        while let Some(idx) = cursor {
            match marks[idx] {
                Mark::Done => break,
                Mark::OnPath(walk) if walk == start => {
                    let from = path.iter().position(|&p| p == idx).unwrap_or(0);
                    if let Some(&victim) = path[from..].iter().min() {
                        cut.push(victim);
                    }
                    break;
                }
                _ => {
                    marks[idx] = Mark::OnPath(start);
                    path.push(idx);
                    cursor = parent_slot[idx];
                }
            }
        }
        for &idx in &path {
            marks[idx] = Mark::Done;
        }
    }

    for &idx in &cut {
        nodes[idx].parent_id = None;
    }
    tracing::debug!(broken = cut.len(), "parent cycles");
    cut.len()
}
