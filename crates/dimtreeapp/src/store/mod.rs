//! # Storage Layer
//!
//! This module defines the storage abstraction for dimtree. The [`DataStore`] trait
//! is the Node Store and Type Registry persistence the command layer talks to.
//!
//! ## Two Levels
//!
//! 1. [`backend::StorageBackend`]: raw I/O. Loads and saves whole collections
//!    (`types.json`, `nodes.json`) and nothing else.
//! 2. [`dim_store::DimStore`]: the "what". Implements [`DataStore`] over any
//!    backend: secondary lookups, uniqueness, and version-checked commits.
//!
//! ## Lookups
//!
//! Node records are keyed by generated id. The lookups the tree algorithms need
//! are served by scanning the collection:
//!
//! | Lookup | Method |
//! |--------|--------|
//! | unique `(type_code, code)` | [`DataStore::find_by_code`] |
//! | `(type_code, parent_id)` by `sort_order` | [`DataStore::children`] |
//! | `(type_code, path)` prefix | [`DataStore::descendants`] |
//! | `(type_code, status)` | [`DataStore::list_nodes`] |
//!
//! ## Commits
//!
//! Node writes go through [`DataStore::commit_nodes`], which takes a batch:
//!
//! - Each node's `version` must match the stored version (0 for new nodes),
//!   otherwise the whole batch is rejected with a conflict.
//! - `(type_code, code)` must stay unique after the batch is applied.
//! - On success every node's version is bumped and the whole collection is
//!   written in one atomic backend write.
//!
//! A cascading re-parent is therefore all-or-nothing. File-backed stores also
//! hold an exclusive lock file for the duration of the commit.
//!
//! Under that lock the batch is also checked against what is stored *now*,
//! not only against the versions it was read at:
//!
//! - A node whose parent, path or depth changes must hang off a stored parent
//!   of the same type, with `path = parent.path/id` and `depth = parent.depth + 1`.
//!   A parent deleted or moved since it was read fails this check, and so does
//!   a move that would close a cycle with another writer's move.
//! - A node whose path changes must take its whole subtree with it. A child
//!   added under it since the descendants were read is a conflict.
//! - A [`ReadSet`] names sibling sets the batch was computed from. Any
//!   membership change since the read is a conflict.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files in a data directory.
//! - [`memory::InMemoryStore`]: For testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── types.json      # Type registry, keyed by code
//! ├── nodes.json      # All nodes, keyed by id
//! ├── dimtree.toml    # Optional configuration
//! └── .lock           # Writer lock
//! ```

use crate::error::Result;
use crate::model::{DimensionNode, DimensionType, NodeId, NodeStatus};
use std::collections::BTreeSet;

pub mod backend;
pub mod dim_store;
pub mod fs;
pub mod fs_backend;
pub mod lock;
pub mod mem_backend;
pub mod memory;

/// Sibling sets a batch was computed from, re-checked when it is committed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadSet {
    siblings: Vec<SiblingSet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SiblingSet {
    pub type_code: String,
    pub parent_id: Option<NodeId>,
    pub ids: BTreeSet<NodeId>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the live children of `parent_id` to still be exactly `nodes`.
    pub fn siblings(
        mut self,
        type_code: &str,
        parent_id: Option<&NodeId>,
        nodes: &[DimensionNode],
    ) -> Self {
        self.siblings.push(SiblingSet {
            type_code: type_code.to_string(),
            parent_id: parent_id.copied(),
            ids: nodes.iter().map(|n| n.id).collect(),
        });
        self
    }

    pub(crate) fn sibling_sets(&self) -> &[SiblingSet] {
        &self.siblings
    }
}

/// Abstract interface for dimension storage.
pub trait DataStore {
    // --- Type Registry ---

    /// Get a type by its normalized code
    fn find_type(&self, code: &str) -> Result<Option<DimensionType>>;

    /// All registered types, ordered by code
    fn list_types(&self) -> Result<Vec<DimensionType>>;

    /// Register a new type. Conflict if the code is taken.
    fn insert_type(&mut self, dim_type: &DimensionType) -> Result<()>;

    /// Replace an existing type. NotFound if the code is unknown.
    fn replace_type(&mut self, dim_type: &DimensionType) -> Result<()>;

    // --- Node lookups ---

    /// Get a node by id, whatever its type
    fn find_node(&self, id: &NodeId) -> Result<Option<DimensionNode>>;

    /// Get a node by its normalized code within a type
    fn find_by_code(&self, type_code: &str, code: &str) -> Result<Option<DimensionNode>>;

    /// Live sibling set under `parent_id` (`None` = roots), by `sort_order`
    fn children(&self, type_code: &str, parent_id: Option<&NodeId>) -> Result<Vec<DimensionNode>>;

    /// Every node strictly below the node at `path`
    fn descendants(&self, type_code: &str, path: &str) -> Result<Vec<DimensionNode>>;

    /// Nodes of a type in depth-first order, optionally filtered by status
    fn list_nodes(&self, type_code: &str, status: Option<NodeStatus>)
        -> Result<Vec<DimensionNode>>;

    // --- Node writes ---

    /// Write a batch of nodes atomically, checking versions, placement and code
    /// uniqueness. Returns the committed records (with bumped versions).
    fn commit_nodes(&mut self, nodes: &[DimensionNode]) -> Result<Vec<DimensionNode>> {
        self.commit_nodes_reading(nodes, &ReadSet::default())
    }

    /// [`DataStore::commit_nodes`], also rejecting the batch if anything in
    /// `reads` changed since it was read.
    fn commit_nodes_reading(
        &mut self,
        nodes: &[DimensionNode],
        reads: &ReadSet,
    ) -> Result<Vec<DimensionNode>>;

    /// Remove a childless node. Conflict if it has children or a newer version.
    fn remove_node(&mut self, node: &DimensionNode) -> Result<()>;

    /// Where the data lives (for diagnostics)
    fn location(&self) -> String;
}
