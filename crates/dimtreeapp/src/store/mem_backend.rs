use super::backend::{NodeIndex, StorageBackend, TypeIndex};
use crate::error::{DimError, Result};
use std::cell::{Cell, RefCell};

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since a store is driven from one
/// thread. This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    types: RefCell<TypeIndex>,
    nodes: RefCell<NodeIndex>,
    simulate_write_error: Cell<bool>,
    node_writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful `save_nodes` calls so far.
    pub fn node_writes(&self) -> usize {
        self.node_writes.get()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(DimError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_types(&self) -> Result<TypeIndex> {
        Ok(self.types.borrow().clone())
    }

    fn save_types(&self, types: &TypeIndex) -> Result<()> {
        self.check_writable()?;
        *self.types.borrow_mut() = types.clone();
        Ok(())
    }

    fn load_nodes(&self) -> Result<NodeIndex> {
        Ok(self.nodes.borrow().clone())
    }

    fn save_nodes(&self, nodes: &NodeIndex) -> Result<()> {
        self.check_writable()?;
        *self.nodes.borrow_mut() = nodes.clone();
        self.node_writes.set(self.node_writes.get() + 1);
        Ok(())
    }

    fn location(&self) -> String {
        "memory://dimtree".to_string()
    }
}
