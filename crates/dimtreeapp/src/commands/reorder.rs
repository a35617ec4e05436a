use crate::error::{DimError, Result};
use crate::model::{DimensionNode, NodeId};
use crate::store::{DataStore, ReadSet};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::helpers::resolve_type;

/// Assign `sort_order = position + 1` to every sibling under `parent_id`.
///
/// `node_ids` must name each live sibling exactly once. A sibling added or
/// removed by another writer before the commit makes it a conflict.
pub fn run<S: DataStore>(
    store: &mut S,
    type_code: &str,
    parent_id: Option<&NodeId>,
    node_ids: &[NodeId],
    actor: &str,
) -> Result<Vec<DimensionNode>> {
    let dim_type = resolve_type(store, type_code)?;
    let siblings = store.children(&dim_type.code, parent_id)?;

    let requested: HashSet<&NodeId> = node_ids.iter().collect();
    let current: HashSet<&NodeId> = siblings.iter().map(|n| &n.id).collect();
    if requested.len() != node_ids.len() || requested != current {
        debug!(
            "reorder rejected: {} id(s) given, {} sibling(s) present",
            node_ids.len(),
            siblings.len()
        );
        return Err(DimError::validation(
            "Reorder list must contain exactly current sibling node ids",
        ));
    }

    let position: HashMap<&NodeId, u32> = node_ids
        .iter()
        .zip(1u32..)
        .collect();

    let reads = ReadSet::new().siblings(&dim_type.code, parent_id, &siblings);
    let mut batch = siblings;
    for node in batch.iter_mut() {
        if let Some(&sort_order) = position.get(&node.id) {
            node.sort_order = sort_order;
        }
        node.touch(actor);
    }

    let mut committed = store.commit_nodes_reading(&batch, &reads)?;
    committed.sort_by_key(|n| n.sort_order);
    info!(
        "Reordered {} sibling(s) of type {}",
        committed.len(),
        dim_type.code
    );
    Ok(committed)
}
