//! Property-based invariants of the cleaning pipeline and the adapter.
//!
//! Verifies, for arbitrary record lists with duplicate ids, empty or
//! dangling parents, self references and parent cycles:
//! 1. Output ids are unique.
//! 2. After the adapter there is exactly one root, the super-root.
//! 3. The result builds into a hierarchy that reaches every node (acyclic).
//! 4. Cleaning the cleaned output changes nothing.
//! 5. Cascade delete removes a requested id and all of its descendants.

use std::collections::{BTreeSet, HashSet};

use lineage_renderer::clean::{CleanOptions, clean_nodes, clean_records, descendant_closure};
use lineage_renderer::forest::{SUPER_ROOT_ID, adapt};
use lineage_renderer::{Hierarchy, RawRecord};
use proptest::prelude::*;
use serde_json::Value;

// ── Strategy helpers ──────────────────────────────────────────────────

/// Small id space so duplicates and cycles are frequent.
fn arb_id() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0u32..40).prop_map(Value::from),
        (0u32..40).prop_map(|n| Value::from(format!(" {n} "))),
        Just(Value::Null),
    ]
}

fn arb_parent(id: Value) -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::from("")),
        Just(id),
        (0u32..50).prop_map(|n| Value::from(n.to_string())),
    ]
}

fn arb_record() -> impl Strategy<Value = RawRecord> {
    arb_id().prop_flat_map(|id| {
        (arb_parent(id.clone()), "[a-z ]{0,8}")
            .prop_map(move |(parent, name)| RawRecord::new(id.clone(), parent, name))
    })
}

fn arb_records() -> impl Strategy<Value = Vec<RawRecord>> {
    prop::collection::vec(arb_record(), 0..120)
}

proptest! {
    #[test]
    fn cleaned_ids_are_unique(records in arb_records()) {
        let (nodes, report) = clean_records(&records, &CleanOptions::default());
        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), nodes.len());
        prop_assert_eq!(report.output, nodes.len());
    }

    #[test]
    fn adapter_yields_one_acyclic_tree(records in arb_records()) {
        let (nodes, _) = clean_records(&records, &CleanOptions::default());
        let adapted = adapt(nodes, &[], "Family Tree");
        let roots: Vec<&str> = adapted
            .iter()
            .filter(|n| n.parent_id.is_none())
            .map(|n| n.id.as_str())
            .collect();
        prop_assert_eq!(roots, vec![SUPER_ROOT_ID]);

        let tree = Hierarchy::build(&adapted);
        prop_assert!(tree.is_ok(), "hierarchy failed: {:?}", tree.as_ref().err());
        if let Ok(tree) = tree {
            prop_assert_eq!(tree.len(), adapted.len());
        }
    }

    #[test]
    fn cleaning_twice_changes_nothing(records in arb_records()) {
        let (once, _) = clean_records(&records, &CleanOptions::default());
        let (twice, report) = clean_nodes(once.clone(), &CleanOptions::default());
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(report.duplicates_removed, 0);
        prop_assert_eq!(report.dangling_fixed, 0);
        prop_assert_eq!(report.self_parent_fixed, 0);
        prop_assert_eq!(report.cycles_broken, 0);
    }

    #[test]
    fn cascade_delete_takes_the_whole_closure(records in arb_records(), target in 0u32..40) {
        let (nodes, _) = clean_records(&records, &CleanOptions::default());
        let doomed: BTreeSet<String> = [target.to_string()].into_iter().collect();
        let closure = descendant_closure(&nodes, &doomed);

        let (after, report) = clean_nodes(nodes.clone(), &CleanOptions { delete_ids: doomed });
        prop_assert_eq!(report.cascade_deleted, closure.len());
        prop_assert_eq!(after.len(), nodes.len() - closure.len());
        prop_assert!(after.iter().all(|n| !closure.contains(&n.id)));
    }
}
