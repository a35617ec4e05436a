use crate::error::Result;
use crate::model::{DimensionNode, NodeSpec};
use crate::store::DataStore;
use tracing::info;

use super::helpers::{
    clean_code, clean_name, ensure_code_available, first_committed, next_sort_order,
    resolve_parent, resolve_type, validate_depth, validate_sort_order,
};

pub fn run<S: DataStore>(
    store: &mut S,
    type_code: &str,
    spec: &NodeSpec,
    actor: &str,
) -> Result<DimensionNode> {
    let dim_type = resolve_type(store, type_code)?;
    let parent = resolve_parent(store, &dim_type, spec.parent_id.as_ref())?;
    let depth = parent.as_ref().map(|p| p.depth + 1).unwrap_or(0);
    validate_depth(&dim_type, depth)?;

    let code = clean_code(&spec.code)?;
    let name = clean_name(&spec.name)?;
    ensure_code_available(store, &dim_type.code, &code, None)?;

    let sort_order = match spec.sort_order {
        Some(given) => {
            validate_sort_order(given)?;
            given
        }
        None => next_sort_order(store, &dim_type.code, spec.parent_id.as_ref(), None)?,
    };

    let mut node = DimensionNode::new(&dim_type.code, code, name, parent.as_ref(), sort_order, actor);
    node.description = spec.description.clone();
    node.attributes = spec.attributes.clone().unwrap_or_default();

    let committed = store.commit_nodes(std::slice::from_ref(&node))?;
    info!(
        "Created {} node {} at depth {}",
        dim_type.code, node.code, node.depth
    );
    first_committed(committed)
}
