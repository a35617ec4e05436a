//! # Materialized Path Algebra
//!
//! Pure functions over node paths. Nothing here touches a store; the command
//! layer composes these into create/update/move.
//!
//! ```text
//! A            path "A"       depth 0
//! └── B        path "A/B"     depth 1
//!     └── C    path "A/B/C"   depth 2
//! ```
//!
//! Moving `B` to the root rewrites its subtree by swapping the `"A/B"` prefix
//! for `"B"` and shifting every depth by the same delta (-1):
//!
//! ```text
//! B            path "B"       depth 0
//! └── C        path "B/C"     depth 1
//! ```
//!
//! Prefix checks always include the separator: `"A/B"` is not inside `"A/BC"`.

use std::collections::{HashMap, HashSet};

use crate::model::{DimensionNode, NodeId};

pub const SEPARATOR: char = '/';

/// Path of a node given its parent's path (`None` for roots).
pub fn node_path(parent_path: Option<&str>, id: &NodeId) -> String {
    match parent_path {
        Some(parent) => format!("{}{}{}", parent, SEPARATOR, id),
        None => id.to_string(),
    }
}

/// True if `path` lies strictly below `ancestor_path`.
pub fn is_within(path: &str, ancestor_path: &str) -> bool {
    path.len() > ancestor_path.len() + 1
        && path.starts_with(ancestor_path)
        && path[ancestor_path.len()..].starts_with(SEPARATOR)
}

/// Number of ancestors encoded in `path`.
pub fn depth_of(path: &str) -> u32 {
    path.matches(SEPARATOR).count() as u32
}

/// Replace the `old_root` prefix of `path` with `new_root`.
///
/// Returns `None` when `path` is neither `old_root` itself nor inside it.
pub fn rebase_path(path: &str, old_root: &str, new_root: &str) -> Option<String> {
    if path == old_root {
        return Some(new_root.to_string());
    }
    if !is_within(path, old_root) {
        return None;
    }
    Some(format!("{}{}", new_root, &path[old_root.len()..]))
}

/// Apply a signed depth delta; `None` if the result would be negative.
pub fn shift_depth(depth: u32, delta: i64) -> Option<u32> {
    let shifted = i64::from(depth) + delta;
    u32::try_from(shifted).ok()
}

/// Order nodes depth-first, siblings by `sort_order` (ties by code, then id).
///
/// Parents always precede their descendants and every subtree is contiguous.
/// Nodes whose parent is absent from `nodes` are treated as extra roots and
/// listed after the real ones.
pub fn tree_order(nodes: Vec<DimensionNode>) -> Vec<DimensionNode> {
    let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
    let mut roots: Vec<DimensionNode> = Vec::new();
    let mut children: HashMap<NodeId, Vec<DimensionNode>> = HashMap::new();

    for node in nodes {
        match node.parent_id {
            Some(parent) if ids.contains(&parent) && parent != node.id => {
                children.entry(parent).or_default().push(node)
            }
            _ => roots.push(node),
        }
    }

    let sibling_key = |n: &DimensionNode| (n.sort_order, n.code.clone(), n.id);
    roots.sort_by_key(|n| (n.parent_id.is_some(), sibling_key(n)));
    for group in children.values_mut() {
        group.sort_by_key(sibling_key);
    }

    let mut ordered = Vec::with_capacity(ids.len());
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<DimensionNode> = roots.into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.id) {
            continue;
        }
        if let Some(kids) = children.remove(&node.id) {
            stack.extend(kids.into_iter().rev());
        }
        ordered.push(node);
    }

    // Whatever is left hangs off a parent cycle; keep it visible.
    let mut stranded: Vec<DimensionNode> = children
        .into_values()
        .flatten()
        .filter(|n| !visited.contains(&n.id))
        .collect();
    stranded.sort_by(|a, b| a.path.cmp(&b.path));
    ordered.extend(stranded);

    ordered
}
