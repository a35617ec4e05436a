use super::backend::{NodeIndex, StorageBackend};
use super::{DataStore, ReadSet};
use crate::error::{DimError, Result};
use crate::model::{DimensionNode, DimensionType, NodeId, NodeStatus};
use crate::tree;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

pub struct DimStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> DimStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn nodes_of_type(&self, type_code: &str) -> Result<Vec<DimensionNode>> {
        Ok(self
            .backend
            .load_nodes()?
            .into_values()
            .filter(|n| n.type_code == type_code)
            .collect())
    }
}

/// Reject the batch if any node was changed since it was read.
fn check_versions(index: &NodeIndex, batch: &[DimensionNode]) -> Result<()> {
    let mut seen = HashSet::with_capacity(batch.len());
    for node in batch {
        if !seen.insert(node.id) {
            return Err(DimError::Store(format!(
                "Batch contains node {} more than once",
                node.id
            )));
        }
        let stored = index.get(&node.id).map(|n| n.version).unwrap_or(0);
        if stored != node.version {
            return Err(DimError::conflict(format!(
                "Node {} was modified concurrently (read version {}, stored version {})",
                node.code, node.version, stored
            )));
        }
    }
    Ok(())
}

/// Reject the batch if a sibling set it was computed from gained or lost members.
fn check_read_set(index: &NodeIndex, reads: &ReadSet) -> Result<()> {
    for set in reads.sibling_sets() {
        let stored: BTreeSet<NodeId> = index
            .values()
            .filter(|n| n.type_code == set.type_code && n.parent_id == set.parent_id)
            .map(|n| n.id)
            .collect();
        if stored != set.ids {
            return Err(DimError::conflict(format!(
                "Siblings changed concurrently ({} read, {} stored)",
                set.ids.len(),
                stored.len()
            )));
        }
    }
    Ok(())
}

/// `node`'s path and depth agree with its stored parent.
fn placed_under_parent(index: &NodeIndex, node: &DimensionNode) -> bool {
    match node.parent_id {
        Some(pid) => index.get(&pid).is_some_and(|parent| {
            parent.type_code == node.type_code
                && node.depth == parent.depth + 1
                && node.path == tree::node_path(Some(parent.path.as_str()), &node.id)
        }),
        None => node.depth == 0 && node.path == tree::node_path(None, &node.id),
    }
}

/// What a batch entry changes about its node's place in the tree.
#[derive(Debug, Clone, Copy)]
struct Placement {
    moved: bool,
    path_changed: bool,
}

fn placement(index: &NodeIndex, node: &DimensionNode) -> Placement {
    match index.get(&node.id) {
        Some(old) => Placement {
            moved: old.parent_id != node.parent_id
                || old.path != node.path
                || old.depth != node.depth,
            path_changed: old.path != node.path,
        },
        None => Placement {
            moved: true,
            path_changed: false,
        },
    }
}

/// Check re-placed nodes against the index with the batch applied.
fn check_structure(
    index: &NodeIndex,
    committed: &[DimensionNode],
    placements: &[Placement],
) -> Result<()> {
    for (node, place) in committed.iter().zip(placements) {
        if place.moved && !placed_under_parent(index, node) {
            return Err(DimError::conflict(format!(
                "Parent of node {} changed concurrently",
                node.code
            )));
        }
        if place.path_changed {
            let stale_child = index
                .values()
                .filter(|child| child.parent_id == Some(node.id))
                .find(|child| !placed_under_parent(index, child));
            if let Some(child) = stale_child {
                return Err(DimError::conflict(format!(
                    "Subtree of node {} changed concurrently (child {} was not rebased)",
                    node.code, child.code
                )));
            }
        }
    }
    Ok(())
}

fn check_unique_codes(index: &NodeIndex, batch: &[DimensionNode]) -> Result<()> {
    for node in batch {
        let clash = index.values().any(|other| {
            other.id != node.id && other.type_code == node.type_code && other.code == node.code
        });
        if clash {
            return Err(DimError::conflict(format!(
                "Node code already exists in this dimension type ({})",
                node.code
            )));
        }
    }
    Ok(())
}

impl<B: StorageBackend> DataStore for DimStore<B> {
    fn find_type(&self, code: &str) -> Result<Option<DimensionType>> {
        Ok(self.backend.load_types()?.remove(code))
    }

    fn list_types(&self) -> Result<Vec<DimensionType>> {
        // BTreeMap keeps codes ordered
        Ok(self.backend.load_types()?.into_values().collect())
    }

    fn insert_type(&mut self, dim_type: &DimensionType) -> Result<()> {
        let _lock = self.backend.write_lock()?;
        let mut types = self.backend.load_types()?;
        if types.contains_key(&dim_type.code) {
            return Err(DimError::conflict("Dimension type code already exists"));
        }
        types.insert(dim_type.code.clone(), dim_type.clone());
        self.backend.save_types(&types)
    }

    fn replace_type(&mut self, dim_type: &DimensionType) -> Result<()> {
        let _lock = self.backend.write_lock()?;
        let mut types = self.backend.load_types()?;
        match types.get_mut(&dim_type.code) {
            Some(existing) => *existing = dim_type.clone(),
            None => return Err(DimError::not_found("Dimension type not found")),
        }
        self.backend.save_types(&types)
    }

    fn find_node(&self, id: &NodeId) -> Result<Option<DimensionNode>> {
        Ok(self.backend.load_nodes()?.remove(id))
    }

    fn find_by_code(&self, type_code: &str, code: &str) -> Result<Option<DimensionNode>> {
        Ok(self
            .backend
            .load_nodes()?
            .into_values()
            .find(|n| n.type_code == type_code && n.code == code))
    }

    fn children(&self, type_code: &str, parent_id: Option<&NodeId>) -> Result<Vec<DimensionNode>> {
        let mut siblings: Vec<DimensionNode> = self
            .nodes_of_type(type_code)?
            .into_iter()
            .filter(|n| n.parent_id.as_ref() == parent_id)
            .collect();
        siblings.sort_by(|a, b| {
            (a.sort_order, &a.code, a.id).cmp(&(b.sort_order, &b.code, b.id))
        });
        Ok(siblings)
    }

    fn descendants(&self, type_code: &str, path: &str) -> Result<Vec<DimensionNode>> {
        Ok(self
            .nodes_of_type(type_code)?
            .into_iter()
            .filter(|n| tree::is_within(&n.path, path))
            .collect())
    }

    fn list_nodes(
        &self,
        type_code: &str,
        status: Option<NodeStatus>,
    ) -> Result<Vec<DimensionNode>> {
        // Order over the full set so filtered-out parents don't scramble children
        let ordered = tree::tree_order(self.nodes_of_type(type_code)?);
        Ok(match status {
            Some(status) => ordered.into_iter().filter(|n| n.status == status).collect(),
            None => ordered,
        })
    }

    fn commit_nodes_reading(
        &mut self,
        batch: &[DimensionNode],
        reads: &ReadSet,
    ) -> Result<Vec<DimensionNode>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let _lock = self.backend.write_lock()?;
        let mut index = self.backend.load_nodes()?;
        check_versions(&index, batch)?;
        check_read_set(&index, reads)?;
        let placements: Vec<Placement> = batch.iter().map(|n| placement(&index, n)).collect();

        let mut committed = Vec::with_capacity(batch.len());
        for node in batch {
            let mut next = node.clone();
            next.version += 1;
            index.insert(next.id, next.clone());
            committed.push(next);
        }
        check_unique_codes(&index, &committed)?;
        check_structure(&index, &committed, &placements)?;

        self.backend.save_nodes(&index)?;
        debug!(
            "commit_nodes: wrote {} node(s) to {}",
            committed.len(),
            self.backend.location()
        );
        Ok(committed)
    }

    fn remove_node(&mut self, node: &DimensionNode) -> Result<()> {
        let _lock = self.backend.write_lock()?;
        let mut index = self.backend.load_nodes()?;

        let stored = index
            .get(&node.id)
            .ok_or_else(|| DimError::not_found("Dimension node not found"))?;
        if stored.version != node.version {
            return Err(DimError::conflict(format!(
                "Node {} was modified concurrently (read version {}, stored version {})",
                node.code, node.version, stored.version
            )));
        }
        if index.values().any(|n| n.parent_id == Some(node.id)) {
            return Err(DimError::conflict("Cannot delete node with children"));
        }

        index.remove(&node.id);
        self.backend.save_nodes(&index)
    }

    fn location(&self) -> String {
        self.backend.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{EntryBehavior, NodeStatus};
    use crate::store::mem_backend::MemBackend;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_store() -> DimStore<MemBackend> {
        DimStore::with_backend(MemBackend::new())
    }

    fn make_type(code: &str) -> DimensionType {
        let now = Utc::now();
        DimensionType {
            code: code.into(),
            name: code.into(),
            description: None,
            hierarchical: true,
            max_depth: 4,
            entry_behavior: EntryBehavior::Optional,
            status: NodeStatus::Active,
            created_at: now,
            created_by: "test".into(),
            updated_at: now,
            updated_by: "test".into(),
        }
    }

    fn make_node(type_code: &str, code: &str, parent: Option<&DimensionNode>) -> DimensionNode {
        let id = Uuid::new_v4();
        let now = Utc::now();
        DimensionNode {
            id,
            type_code: type_code.into(),
            code: code.into(),
            name: code.into(),
            description: None,
            parent_id: parent.map(|p| p.id),
            path: tree::node_path(parent.map(|p| p.path.as_str()), &id),
            depth: parent.map(|p| p.depth + 1).unwrap_or(0),
            sort_order: 1,
            attributes: Default::default(),
            status: NodeStatus::Active,
            created_at: now,
            created_by: "test".into(),
            updated_at: now,
            updated_by: "test".into(),
            version: 0,
        }
    }

    fn commit_one(store: &mut DimStore<MemBackend>, node: &DimensionNode) -> DimensionNode {
        store
            .commit_nodes(std::slice::from_ref(node))
            .unwrap()
            .remove(0)
    }

    // --- Type Registry ---

    #[test]
    fn insert_type_rejects_duplicate_code() {
        let mut store = make_store();
        store.insert_type(&make_type("FUND")).unwrap();
        let err = store.insert_type(&make_type("FUND")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn list_types_is_ordered_by_code() {
        let mut store = make_store();
        store.insert_type(&make_type("PROGRAM")).unwrap();
        store.insert_type(&make_type("FUND")).unwrap();
        let codes: Vec<String> = store.list_types().unwrap().into_iter().map(|t| t.code).collect();
        assert_eq!(codes, vec!["FUND", "PROGRAM"]);
    }

    #[test]
    fn replace_unknown_type_is_not_found() {
        let mut store = make_store();
        let err = store.replace_type(&make_type("NOPE")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // --- Commits ---

    #[test]
    fn commit_bumps_versions() {
        let mut store = make_store();
        let node = make_node("T", "A", None);

        let first = commit_one(&mut store, &node);
        assert_eq!(first.version, 1);

        let second = commit_one(&mut store, &first);
        assert_eq!(second.version, 2);
        assert_eq!(store.find_node(&node.id).unwrap().unwrap().version, 2);
    }

    #[test]
    fn commit_with_stale_version_is_conflict_and_writes_nothing() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));
        let b = commit_one(&mut store, &make_node("T", "B", None));

        // Someone else updates A after we read it
        let mut theirs = a.clone();
        theirs.name = "Theirs".into();
        commit_one(&mut store, &theirs);

        let mut ours_a = a.clone();
        ours_a.name = "Ours".into();
        let mut ours_b = b.clone();
        ours_b.name = "Ours too".into();

        let err = store.commit_nodes(&[ours_b, ours_a]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // B untouched even though it came first in the batch
        assert_eq!(store.find_node(&b.id).unwrap().unwrap().name, "B");
        assert_eq!(store.find_node(&a.id).unwrap().unwrap().name, "Theirs");
    }

    #[test]
    fn commit_enforces_code_uniqueness_per_type() {
        let mut store = make_store();
        commit_one(&mut store, &make_node("T", "A", None));

        let dup = make_node("T", "A", None);
        let err = store.commit_nodes(&[dup]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // Same code in another type is fine
        commit_one(&mut store, &make_node("OTHER", "A", None));
    }

    #[test]
    fn commit_is_a_single_backend_write() {
        let mut store = make_store();
        let a = make_node("T", "A", None);
        let b = make_node("T", "B", Some(&a));
        let c = make_node("T", "C", Some(&b));
        store.commit_nodes(&[a, b, c]).unwrap();
        assert_eq!(store.backend().node_writes(), 1);
    }

    #[test]
    fn commit_fails_cleanly_on_write_error() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));

        store.backend().set_simulate_write_error(true);
        let mut renamed = a.clone();
        renamed.name = "Renamed".into();
        assert!(store.commit_nodes(&[renamed]).is_err());

        store.backend().set_simulate_write_error(false);
        let stored = store.find_node(&a.id).unwrap().unwrap();
        assert_eq!(stored.name, "A");
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn commit_under_missing_parent_is_conflict() {
        let mut store = make_store();
        let parent = make_node("T", "A", None);
        let child = make_node("T", "B", Some(&parent));

        let err = store.commit_nodes(&[child]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(store.list_nodes("T", None).unwrap().is_empty());
    }

    #[test]
    fn commit_with_path_not_matching_parent_is_conflict() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));
        let x = commit_one(&mut store, &make_node("T", "X", None));

        // A moves under X
        let mut a_moved = a.clone();
        a_moved.parent_id = Some(x.id);
        a_moved.path = tree::node_path(Some(x.path.as_str()), &a.id);
        a_moved.depth = 1;
        commit_one(&mut store, &a_moved);

        // X under A, planned from A's old path
        let mut x_moved = x.clone();
        x_moved.parent_id = Some(a.id);
        x_moved.path = tree::node_path(Some(a.path.as_str()), &x.id);
        x_moved.depth = 1;
        let err = store.commit_nodes(&[x_moved]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(store.find_node(&x.id).unwrap().unwrap().is_root());
    }

    #[test]
    fn commit_that_strands_a_child_is_conflict() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));
        let x = commit_one(&mut store, &make_node("T", "X", None));
        commit_one(&mut store, &make_node("T", "B", Some(&a)));

        // Rebase A alone, without the child that now exists under it
        let mut a_moved = a.clone();
        a_moved.parent_id = Some(x.id);
        a_moved.path = tree::node_path(Some(x.path.as_str()), &a.id);
        a_moved.depth = 1;
        let err = store.commit_nodes(&[a_moved]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(store.find_node(&a.id).unwrap().unwrap().is_root());
    }

    #[test]
    fn unchanged_placement_skips_parent_check() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));
        let mut b = commit_one(&mut store, &make_node("T", "B", Some(&a)));

        // A stored record that is already inconsistent can still be renamed
        let mut index = store.backend().load_nodes().unwrap();
        index.get_mut(&b.id).unwrap().depth = 5;
        store.backend().save_nodes(&index).unwrap();
        b.depth = 5;

        b.name = "Renamed".into();
        commit_one(&mut store, &b);
        assert_eq!(store.find_node(&b.id).unwrap().unwrap().name, "Renamed");
    }

    #[test]
    fn read_set_rejects_changed_sibling_set() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));
        let reads = ReadSet::new().siblings("T", None, std::slice::from_ref(&a));

        commit_one(&mut store, &make_node("T", "B", None));

        let err = store
            .commit_nodes_reading(std::slice::from_ref(&a), &reads)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let fresh = store.children("T", None).unwrap();
        let reads = ReadSet::new().siblings("T", None, &fresh);
        store.commit_nodes_reading(&fresh, &reads).unwrap();
    }

    // --- Lookups ---

    #[test]
    fn children_are_scoped_and_sorted() {
        let mut store = make_store();
        let root = commit_one(&mut store, &make_node("T", "ROOT", None));

        let mut second = make_node("T", "SECOND", Some(&root));
        second.sort_order = 2;
        let mut first = make_node("T", "FIRST", Some(&root));
        first.sort_order = 1;
        let foreign = make_node("OTHER", "FOREIGN", None);
        store.commit_nodes(&[second, first, foreign]).unwrap();

        let kids: Vec<String> = store
            .children("T", Some(&root.id))
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        assert_eq!(kids, vec!["FIRST", "SECOND"]);

        let roots = store.children("T", None).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].code, "ROOT");
    }

    #[test]
    fn descendants_use_path_prefix() {
        let mut store = make_store();
        let a = make_node("T", "A", None);
        let b = make_node("T", "B", Some(&a));
        let c = make_node("T", "C", Some(&b));
        let other = make_node("T", "OTHER", None);
        store
            .commit_nodes(&[a.clone(), b.clone(), c, other])
            .unwrap();

        let mut below_a: Vec<String> = store
            .descendants("T", &a.path)
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        below_a.sort();
        assert_eq!(below_a, vec!["B", "C"]);
        assert_eq!(store.descendants("T", &b.path).unwrap().len(), 1);
    }

    #[test]
    fn list_nodes_filters_by_status() {
        let mut store = make_store();
        let a = make_node("T", "A", None);
        let mut b = make_node("T", "B", Some(&a));
        b.status = NodeStatus::Inactive;
        store.commit_nodes(&[a, b]).unwrap();

        assert_eq!(store.list_nodes("T", None).unwrap().len(), 2);
        let active = store.list_nodes("T", Some(NodeStatus::Active)).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, "A");
    }

    // --- Removal ---

    #[test]
    fn remove_node_with_children_is_conflict() {
        let mut store = make_store();
        let a = make_node("T", "A", None);
        let b = make_node("T", "B", Some(&a));
        let committed = store.commit_nodes(&[a, b]).unwrap();

        let err = store.remove_node(&committed[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        store.remove_node(&committed[1]).unwrap();
        store.remove_node(&committed[0]).unwrap();
        assert!(store.list_nodes("T", None).unwrap().is_empty());
    }

    #[test]
    fn remove_stale_node_is_conflict() {
        let mut store = make_store();
        let a = commit_one(&mut store, &make_node("T", "A", None));
        commit_one(&mut store, &a);

        let err = store.remove_node(&a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
