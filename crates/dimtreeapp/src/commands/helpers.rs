use crate::error::{DimError, Result};
use crate::model::{normalize_code, DimensionNode, DimensionType, NodeId};
use crate::store::DataStore;
use crate::tree;
use tracing::debug;

/// Look up a type by (unnormalized) code.
pub fn resolve_type<S: DataStore>(store: &S, type_code: &str) -> Result<DimensionType> {
    store
        .find_type(&normalize_code(type_code))?
        .ok_or_else(|| DimError::not_found("Dimension type not found"))
}

/// Fetch a node and make sure it belongs to `dim_type`.
pub fn get_node_checked<S: DataStore>(
    store: &S,
    dim_type: &DimensionType,
    id: &NodeId,
) -> Result<DimensionNode> {
    let node = store
        .find_node(id)?
        .ok_or_else(|| DimError::not_found("Dimension node not found"))?;
    if node.type_code != dim_type.code {
        return Err(DimError::validation(
            "Node does not belong to requested type",
        ));
    }
    Ok(node)
}

/// Resolve an optional parent id. `None` means "root".
pub fn resolve_parent<S: DataStore>(
    store: &S,
    dim_type: &DimensionType,
    parent_id: Option<&NodeId>,
) -> Result<Option<DimensionNode>> {
    let Some(parent_id) = parent_id else {
        return Ok(None);
    };
    let parent = store
        .find_node(parent_id)?
        .ok_or_else(|| DimError::not_found("Parent node not found"))?;
    if parent.type_code != dim_type.code {
        return Err(DimError::validation("Parent node must be same type"));
    }
    Ok(Some(parent))
}

pub fn validate_depth(dim_type: &DimensionType, depth: u32) -> Result<()> {
    if depth > dim_type.max_depth {
        return Err(DimError::validation(format!(
            "Depth exceeds maxDepth for dimension type ({} > {})",
            depth, dim_type.max_depth
        )));
    }
    Ok(())
}

/// Normalize a user-supplied node code, rejecting blanks.
pub fn clean_code(code: &str) -> Result<String> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(DimError::validation("Code must not be blank"));
    }
    if code.contains(tree::SEPARATOR) {
        return Err(DimError::validation(format!(
            "Code must not contain '{}'",
            tree::SEPARATOR
        )));
    }
    Ok(code)
}

pub fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DimError::validation("Name must not be blank"));
    }
    Ok(name.to_string())
}

pub fn validate_sort_order(sort_order: u32) -> Result<()> {
    if sort_order == 0 {
        return Err(DimError::validation("Sort order must be positive"));
    }
    Ok(())
}

/// Conflict if another node of the type already uses `code`.
pub fn ensure_code_available<S: DataStore>(
    store: &S,
    type_code: &str,
    code: &str,
    owner: Option<&NodeId>,
) -> Result<()> {
    match store.find_by_code(type_code, code)? {
        Some(existing) if Some(&existing.id) != owner => Err(DimError::conflict(
            "Node code already exists in this dimension type",
        )),
        _ => Ok(()),
    }
}

/// One past the largest `sort_order` among the live siblings under `parent_id`.
/// `exclude` leaves a node out of the sibling set (a node being moved).
pub fn next_sort_order<S: DataStore>(
    store: &S,
    type_code: &str,
    parent_id: Option<&NodeId>,
    exclude: Option<&NodeId>,
) -> Result<u32> {
    let max = store
        .children(type_code, parent_id)?
        .iter()
        .filter(|n| Some(&n.id) != exclude)
        .map(|n| n.sort_order)
        .max()
        .unwrap_or(0);
    Ok(max + 1)
}

/// The lead record of a committed batch.
pub fn first_committed(committed: Vec<DimensionNode>) -> Result<DimensionNode> {
    committed
        .into_iter()
        .next()
        .ok_or_else(|| DimError::Store("Commit returned no records".to_string()))
}

/// Re-parent `node` under `new_parent` and rebase its subtree.
///
/// `node` is updated in place (`parent_id`, `path`, `depth`). The returned
/// descendants carry their rewritten `path`/`depth` and must be committed in the
/// same batch as `node`. Every new depth is validated before returning, so an
/// `Err` means nothing needs to be rolled back.
pub fn relocate<S: DataStore>(
    store: &S,
    dim_type: &DimensionType,
    node: &mut DimensionNode,
    new_parent: Option<&DimensionNode>,
    actor: &str,
) -> Result<Vec<DimensionNode>> {
    if let Some(parent) = new_parent {
        if parent.id == node.id || tree::is_within(&parent.path, &node.path) {
            return Err(DimError::validation("Move would create cycle"));
        }
    }

    let new_depth = new_parent.map(|p| p.depth + 1).unwrap_or(0);
    validate_depth(dim_type, new_depth)?;
    let new_path = tree::node_path(new_parent.map(|p| p.path.as_str()), &node.id);

    let old_path = std::mem::replace(&mut node.path, new_path);
    let old_depth = std::mem::replace(&mut node.depth, new_depth);
    node.parent_id = new_parent.map(|p| p.id);

    if node.path == old_path && node.depth == old_depth {
        return Ok(Vec::new());
    }

    let delta = i64::from(new_depth) - i64::from(old_depth);
    let mut descendants = store.descendants(&dim_type.code, &old_path)?;
    for descendant in descendants.iter_mut() {
        descendant.path = tree::rebase_path(&descendant.path, &old_path, &node.path)
            .ok_or_else(|| {
                DimError::Store(format!(
                    "Descendant {} is not under {}",
                    descendant.code, old_path
                ))
            })?;
        descendant.depth = tree::shift_depth(descendant.depth, delta).ok_or_else(|| {
            DimError::Store(format!("Descendant {} has an invalid depth", descendant.code))
        })?;
        validate_depth(dim_type, descendant.depth)?;
        descendant.touch(actor);
    }

    debug!(
        "relocate {}: depth {} -> {}, {} descendant(s) rebased",
        node.code,
        old_depth,
        new_depth,
        descendants.len()
    );
    Ok(descendants)
}
