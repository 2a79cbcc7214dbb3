use super::*;

/// Result of normalizing a batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub nodes: Vec<Node>,
    /// Records dropped because their id was missing or empty.
    pub malformed_dropped: usize,
}

/// Turns raw records into canonical nodes, keeping input order.
pub fn normalize_records(records: &[RawRecord]) -> Normalized {
    let mut out = Normalized {
        nodes: Vec::with_capacity(records.len()),
        malformed_dropped: 0,
    };
    for record in records {
        let Some(id) = normalize_id(&record.id) else {
            out.malformed_dropped += 1;
            continue;
        };
        out.nodes.push(Node {
            id,
            parent_id: normalize_id(&record.parent_id),
            name: normalize_name(&record.name),
        });
    }
    tracing::debug!(
        kept = out.nodes.len(),
        dropped = out.malformed_dropped,
        "normalized records"
    );
    out
}
