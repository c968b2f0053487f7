//! Explicit key-based partitioning of sample indices.

use std::collections::BTreeMap;

/// Partitions `0..keys.len()` by key: every input index lands in exactly one
/// group, and groups come out ordered by key.
///
/// This is the grouping half of a grouped reduction done in two explicit
/// steps: partition the indices here, then reduce each index set. Keeping the
/// partition materialized makes the group boundaries inspectable and lets the
/// per-group reductions run in parallel without shared state.
pub fn partition_by<K: Ord + Copy>(keys: &[K]) -> BTreeMap<K, Vec<usize>> {
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (index, &key) in keys.iter().enumerate() {
        groups.entry(key).or_default().push(index);
    }
    groups
}
