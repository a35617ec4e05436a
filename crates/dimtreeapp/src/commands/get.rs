//! Read-only queries. None of these write, even when the data looks inconsistent;
//! see [`doctor`](super::doctor) for repairs.

use crate::error::{DimError, Result};
use crate::model::{normalize_code, DimensionNode, NodeId, NodeStatus};
use crate::store::DataStore;

use super::helpers::{get_node_checked, resolve_parent, resolve_type};

/// All nodes of a type in tree order: parents before children, siblings by
/// `sort_order`. Inactive nodes are skipped unless `include_inactive`.
pub fn nodes<S: DataStore>(
    store: &S,
    type_code: &str,
    include_inactive: bool,
) -> Result<Vec<DimensionNode>> {
    let dim_type = resolve_type(store, type_code)?;
    let status = if include_inactive {
        None
    } else {
        Some(NodeStatus::Active)
    };
    store.list_nodes(&dim_type.code, status)
}

/// Same listing as [`nodes`]; callers nest it by `parent_id`/`depth`.
pub fn tree<S: DataStore>(
    store: &S,
    type_code: &str,
    include_inactive: bool,
) -> Result<Vec<DimensionNode>> {
    nodes(store, type_code, include_inactive)
}

/// Case-insensitive substring match on code or name. A blank query matches all.
pub fn search<S: DataStore>(
    store: &S,
    type_code: &str,
    query: Option<&str>,
    include_inactive: bool,
) -> Result<Vec<DimensionNode>> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    let all = nodes(store, type_code, include_inactive)?;
    if needle.is_empty() {
        return Ok(all);
    }
    Ok(all
        .into_iter()
        .filter(|n| {
            n.code.to_lowercase().contains(&needle) || n.name.to_lowercase().contains(&needle)
        })
        .collect())
}

pub fn node<S: DataStore>(store: &S, type_code: &str, node_id: &NodeId) -> Result<DimensionNode> {
    let dim_type = resolve_type(store, type_code)?;
    get_node_checked(store, &dim_type, node_id)
}

/// Resolve a user-facing selector to a node: a UUID, or a node code within the type.
pub fn lookup<S: DataStore>(store: &S, type_code: &str, selector: &str) -> Result<DimensionNode> {
    let dim_type = resolve_type(store, type_code)?;
    if let Ok(id) = selector.trim().parse::<NodeId>() {
        return get_node_checked(store, &dim_type, &id);
    }
    store
        .find_by_code(&dim_type.code, &normalize_code(selector))?
        .ok_or_else(|| DimError::not_found("Dimension node not found"))
}

/// Direct children of `parent_id` (`None` = roots), by `sort_order`.
pub fn children<S: DataStore>(
    store: &S,
    type_code: &str,
    parent_id: Option<&NodeId>,
) -> Result<Vec<DimensionNode>> {
    let dim_type = resolve_type(store, type_code)?;
    resolve_parent(store, &dim_type, parent_id)?;
    store.children(&dim_type.code, parent_id)
}
