use super::*;

const PLACEHOLDER_NAME: &str = "genealogy";
const NAME_LENGTH_CAP: usize = 80;

/// How informative a record is. Among duplicates the highest score wins.
///
/// A real name is worth 10 plus up to 4 more for length (capped at 80 chars);
/// having any parent adds 1.
pub fn quality_score(node: &Node) -> f32 {
    let mut score = 0.0;
    if !node.name.is_empty() && node.name.to_lowercase() != PLACEHOLDER_NAME {
        let len = node.name.chars().count().min(NAME_LENGTH_CAP);
        score += 10.0 + len as f32 / 20.0;
    }
    if node.parent_id.is_some() {
        score += 1.0;
    }
    score
}

/// Collapses nodes sharing an id to the best-scoring one. Ties keep the
/// earliest record. Returns the survivors in first-seen order and the number
/// of records discarded.
pub fn dedupe(nodes: Vec<Node>) -> (Vec<Node>, usize) {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    let mut best: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut removed = 0usize;

    for node in nodes {
        match slots.get(&node.id) {
            Some(&slot) => {
                removed += 1;
                if quality_score(&node) > quality_score(&best[slot]) {
                    best[slot] = node;
                }
            }
            None => {
                slots.insert(node.id.clone(), best.len());
                best.push(node);
            }
        }
    }

    tracing::debug!(removed, kept = best.len(), "deduplicated nodes");
    (best, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_record_with_parent_wins() {
        let nodes = vec![Node::new("5", None, ""), Node::new("5", Some("1"), "Ahmed")];
        let (out, removed) = dedupe(nodes);
        assert_eq!(removed, 1);
        assert_eq!(out, vec![Node::new("5", Some("1"), "Ahmed")]);
    }

    #[test]
    fn placeholder_name_scores_like_no_name() {
        assert_eq!(quality_score(&Node::new("1", None, "Genealogy")), 0.0);
        assert_eq!(quality_score(&Node::new("1", Some("2"), "GENEALOGY")), 1.0);
    }

    #[test]
    fn long_names_are_capped() {
        let long = "x".repeat(500);
        assert_eq!(quality_score(&Node::new("1", None, &long)), 14.0);
        assert!((quality_score(&Node::new("1", None, "abcd")) - 10.2).abs() < 1e-5);
    }

    #[test]
    fn ties_keep_first_record() {
        let nodes = vec![
            Node::new("8", Some("1"), "Omar"),
            Node::new("8", Some("2"), "Abdi"),
        ];
        let (out, removed) = dedupe(nodes);
        assert_eq!(removed, 1);
        assert_eq!(out[0].parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn survivors_keep_first_seen_order() {
        let nodes = vec![
            Node::new("b", None, ""),
            Node::new("a", None, ""),
            Node::new("b", None, "Better"),
        ];
        let (out, _) = dedupe(nodes);
        let ids: Vec<&str> = out.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(out[0].name, "Better");
    }
}
