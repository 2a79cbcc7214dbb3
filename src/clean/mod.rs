//! Turns untrusted records into a duplicate-free, acyclic node set whose
//! parent references all resolve.
//!
//! The passes run in a fixed order: normalize, dedupe, cascade delete, then
//! the dangling-parent, self-parent and cycle repairs. Every pass is
//! idempotent, so cleaning already-clean output changes nothing.

mod dedup;
mod normalize;
mod repair;

pub use dedup::*;
pub use normalize::*;
pub use repair::*;

use crate::ir::{Node, RawRecord, normalize_id, normalize_name};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Ids removed together with all of their descendants.
    pub delete_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    pub input: usize,
    pub output: usize,
    pub malformed_dropped: usize,
    pub duplicates_removed: usize,
    pub cascade_deleted: usize,
    pub dangling_fixed: usize,
    pub self_parent_fixed: usize,
    pub cycles_broken: usize,
}

pub fn clean_records(records: &[RawRecord], options: &CleanOptions) -> (Vec<Node>, CleanReport) {
    let normalized = normalize_records(records);
    let (nodes, report) = clean_nodes(normalized.nodes, options);
    let report = CleanReport {
        input: records.len(),
        malformed_dropped: normalized.malformed_dropped,
        ..report
    };
    (nodes, report)
}

/// Runs deduplication and repair over already-normalized nodes.
pub fn clean_nodes(nodes: Vec<Node>, options: &CleanOptions) -> (Vec<Node>, CleanReport) {
    let input = nodes.len();
    let (mut nodes, duplicates_removed) = dedupe(nodes);
    let cascade_deleted = cascade_delete(&mut nodes, &options.delete_ids);
    let dangling_fixed = fix_dangling_parents(&mut nodes);
    let self_parent_fixed = fix_self_parents(&mut nodes);
    let cycles_broken = break_cycles(&mut nodes);

    let report = CleanReport {
        input,
        output: nodes.len(),
        malformed_dropped: 0,
        duplicates_removed,
        cascade_deleted,
        dangling_fixed,
        self_parent_fixed,
        cycles_broken,
    };
    tracing::info!(
        input = report.input,
        output = report.output,
        duplicates = report.duplicates_removed,
        deleted = report.cascade_deleted,
        dangling = report.dangling_fixed,
        self_parent = report.self_parent_fixed,
        cycles = report.cycles_broken,
        "cleaned records"
    );
    (nodes, report)
}

/// Output ordering of the cleaning tool: all-digit ids by numeric value first,
/// then every other id lexicographically.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (is_numeric_id(a), is_numeric_id(b)) {
        (true, true) => compare_digits(a, b).then_with(|| a.cmp(b)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

pub fn sort_nodes(nodes: &mut [Node]) {
    nodes.sort_by(|a, b| compare_ids(&a.id, &b.id));
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

// Arbitrary-length digit strings compare by value without parsing.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
