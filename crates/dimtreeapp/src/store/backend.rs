use super::lock::StoreLock;
use crate::error::Result;
use crate::model::{DimensionNode, DimensionType, NodeId};
use std::collections::{BTreeMap, HashMap};

/// Raw type registry, keyed by normalized code.
pub type TypeIndex = BTreeMap<String, DimensionType>;

/// Raw node collection, keyed by generated id.
pub type NodeIndex = HashMap<NodeId, DimensionNode>;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while DimStore handles the "what" (lookups, uniqueness, version checks).
pub trait StorageBackend {
    // --- Type Registry ---

    /// Load the type registry (types.json)
    fn load_types(&self) -> Result<TypeIndex>;

    /// Save the type registry.
    /// MUST be atomic: readers see either the old or the new registry.
    fn save_types(&self, types: &TypeIndex) -> Result<()>;

    // --- Nodes ---

    /// Load every node record (nodes.json)
    fn load_nodes(&self) -> Result<NodeIndex>;

    /// Save every node record.
    /// MUST be atomic: a cascading rewrite lands completely or not at all.
    fn save_nodes(&self, nodes: &NodeIndex) -> Result<()>;

    // --- Writers ---

    /// Take the exclusive writer lock for the duration of a commit.
    /// Backends that are private to one process have nothing to lock.
    fn write_lock(&self) -> Result<Option<StoreLock>> {
        Ok(None)
    }

    /// Human-readable location of the data, for diagnostics.
    fn location(&self) -> String;
}
