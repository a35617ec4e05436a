use crate::error::Result;
use crate::model::{DimensionNode, NodeId, NodeStatus};
use crate::store::DataStore;
use tracing::info;

use super::helpers::{first_committed, get_node_checked, resolve_type};

/// Set a node's status from a case-insensitive `"Active"` / `"Inactive"` token.
///
/// Only the node itself changes; descendants keep their own status.
pub fn run<S: DataStore>(
    store: &mut S,
    type_code: &str,
    node_id: &NodeId,
    status: &str,
    actor: &str,
) -> Result<DimensionNode> {
    let dim_type = resolve_type(store, type_code)?;
    let mut node = get_node_checked(store, &dim_type, node_id)?;
    let status = NodeStatus::parse(status)?;

    node.status = status;
    node.touch(actor);
    let committed = store.commit_nodes(std::slice::from_ref(&node))?;
    info!("Set {} node {} to {}", dim_type.code, node.code, status);
    first_committed(committed)
}
