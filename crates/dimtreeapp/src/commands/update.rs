use crate::error::Result;
use crate::model::{DimensionNode, NodeId, NodeSpec};
use crate::store::DataStore;
use tracing::info;

use super::helpers::{
    clean_code, clean_name, ensure_code_available, first_committed, get_node_checked, relocate,
    resolve_parent, resolve_type, validate_sort_order,
};

/// Replace a node's editable fields, re-parenting it to `spec.parent_id`.
///
/// `spec` is a full replacement: `parent_id = None` moves the node to the root,
/// a missing description or attribute bag clears it. `sort_order` is only
/// changed when given.
pub fn run<S: DataStore>(
    store: &mut S,
    type_code: &str,
    node_id: &NodeId,
    spec: &NodeSpec,
    actor: &str,
) -> Result<DimensionNode> {
    let dim_type = resolve_type(store, type_code)?;
    let mut node = get_node_checked(store, &dim_type, node_id)?;

    let code = clean_code(&spec.code)?;
    let name = clean_name(&spec.name)?;
    if code != node.code {
        ensure_code_available(store, &dim_type.code, &code, Some(&node.id))?;
    }
    if let Some(sort_order) = spec.sort_order {
        validate_sort_order(sort_order)?;
    }

    let new_parent = resolve_parent(store, &dim_type, spec.parent_id.as_ref())?;
    let descendants = relocate(store, &dim_type, &mut node, new_parent.as_ref(), actor)?;

    node.code = code;
    node.name = name;
    node.description = spec.description.clone();
    node.attributes = spec.attributes.clone().unwrap_or_default();
    if let Some(sort_order) = spec.sort_order {
        node.sort_order = sort_order;
    }
    node.touch(actor);

    let mut batch = Vec::with_capacity(descendants.len() + 1);
    batch.push(node);
    batch.extend(descendants);
    let committed = store.commit_nodes(&batch)?;

    info!(
        "Updated {} node {} ({} descendant(s) rebased)",
        dim_type.code,
        batch[0].code,
        batch.len() - 1
    );
    first_committed(committed)
}
