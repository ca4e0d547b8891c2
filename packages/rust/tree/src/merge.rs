//! Merging two trees that describe the same class.
//!
//! The caller fixes which side is left; on every conflict the left side
//! wins, except that a rename present on only one side is always kept.
//! Inputs are borrowed and never modified.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::trace;

use mapfold_shared::{ClassNode, MethodEntry, MethodKey};

/// Shallow merge of two nodes with the same source name.
///
/// Nested classes are unioned by key only: a nested class present on both
/// sides is taken from `left` as is. Use [`merge_deep`] to reconcile those
/// too.
pub fn merge(left: &ClassNode, right: &ClassNode) -> ClassNode {
    debug_assert_eq!(left.source_name(), right.source_name());

    let (winner, other) = if left.is_renamed() || !right.is_renamed() {
        (left, right)
    } else {
        (right, left)
    };
    let mut result = ClassNode::new(left.source_name(), Some(winner.target_name.clone()));
    result.aux_names = winner.aux_names.clone().or_else(|| other.aux_names.clone());

    result.fields = union(&left.fields, &right.fields);
    result.nested = left.nested.clone();
    for (key, class) in &right.nested {
        result
            .nested
            .entry(key.clone())
            .or_insert_with(|| class.clone());
    }
    result.methods = merge_methods(&left.methods, &right.methods);

    trace!(
        class = left.source_name(),
        fields = result.fields.len(),
        methods = result.methods.len(),
        "merged class"
    );
    result
}

/// Merge like [`merge`], first merging nested classes present on both sides
/// recursively with the same left/right order.
pub fn merge_deep(left: &ClassNode, right: &ClassNode) -> ClassNode {
    let mut result = merge(left, right);
    for (key, left_child) in &left.nested {
        if let Some(right_child) = right.nested.get(key) {
            result
                .nested
                .insert(key.clone(), merge_deep(left_child, right_child));
        }
    }
    result
}

fn union<K, V>(left: &IndexMap<K, V>, right: &IndexMap<K, V>) -> IndexMap<K, V>
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    let mut out = left.clone();
    for (key, value) in right {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Shared keys keep the left header and union the argument maps; the
/// remaining right-only methods follow the left ones.
fn merge_methods(
    left: &IndexMap<MethodKey, MethodEntry>,
    right: &IndexMap<MethodKey, MethodEntry>,
) -> IndexMap<MethodKey, MethodEntry> {
    let mut out = IndexMap::with_capacity(left.len() + right.len());

    for (key, method) in left {
        let mut merged = method.clone();
        if let Some(other) = right.get(key) {
            merged.args = merge_args(&method.args, &other.args);
        }
        out.insert(key.clone(), merged);
    }
    for (key, method) in right {
        if !out.contains_key(key) {
            out.insert(key.clone(), method.clone());
        }
    }

    out
}

fn merge_args<V: Clone>(left: &BTreeMap<u32, V>, right: &BTreeMap<u32, V>) -> BTreeMap<u32, V> {
    let mut out = right.clone();
    out.extend(left.iter().map(|(k, v)| (*k, v.clone())));
    out
}
