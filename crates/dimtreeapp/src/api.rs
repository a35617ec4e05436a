//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for every dimtree operation, regardless of the UI in front of it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Stamps the actor** recorded in `created_by` / `updated_by`
//! - **Returns structured types**: records, or [`CmdResult`] for maintenance commands
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **I/O operations**: no stdout, stderr, or formatting
//!
//! ## Type Scoping
//!
//! Every node operation takes the dimension type code first. Codes are
//! normalized (trimmed, uppercased) before lookup, so `"cost_center"` and
//! `"COST_CENTER"` address the same tree. The type is resolved once per call
//! and every validation in that call runs against it.
//!
//! ## Generic Over DataStore
//!
//! `DimApi<S: DataStore>` is generic over the storage backend:
//! - Production: `DimApi<FileStore>`
//! - Testing: `DimApi<InMemoryStore>`
//!
//! ## Testing Strategy
//!
//! API tests verify dispatch and argument passing. Command logic is tested in
//! the command modules, storage behavior in the store modules.

use crate::commands;
use crate::error::Result;
use crate::model::{DimensionNode, DimensionType, NodeId, NodeSpec, TypeSpec};
use crate::store::DataStore;

pub const DEFAULT_ACTOR: &str = "system";

/// The main API facade for dimtree operations.
pub struct DimApi<S: DataStore> {
    store: S,
    actor: String,
}

impl<S: DataStore> DimApi<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            actor: DEFAULT_ACTOR.to_string(),
        }
    }

    /// Record `actor` as the author of every write made through this API.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Type Registry ---

    pub fn create_type(&mut self, spec: &TypeSpec) -> Result<DimensionType> {
        commands::types::create(&mut self.store, spec, &self.actor)
    }

    pub fn update_type(&mut self, code: &str, spec: &TypeSpec) -> Result<DimensionType> {
        commands::types::update(&mut self.store, code, spec, &self.actor)
    }

    pub fn get_type(&self, code: &str) -> Result<DimensionType> {
        commands::types::get(&self.store, code)
    }

    pub fn list_types(&self) -> Result<Vec<DimensionType>> {
        commands::types::list(&self.store)
    }

    // --- Tree mutations ---

    pub fn create_node(&mut self, type_code: &str, spec: &NodeSpec) -> Result<DimensionNode> {
        commands::create::run(&mut self.store, type_code, spec, &self.actor)
    }

    pub fn update_node(
        &mut self,
        type_code: &str,
        node_id: &NodeId,
        spec: &NodeSpec,
    ) -> Result<DimensionNode> {
        commands::update::run(&mut self.store, type_code, node_id, spec, &self.actor)
    }

    pub fn move_node(
        &mut self,
        type_code: &str,
        node_id: &NodeId,
        new_parent_id: Option<&NodeId>,
    ) -> Result<Vec<DimensionNode>> {
        commands::move_node::run(&mut self.store, type_code, node_id, new_parent_id, &self.actor)
    }

    pub fn reorder(
        &mut self,
        type_code: &str,
        parent_id: Option<&NodeId>,
        node_ids: &[NodeId],
    ) -> Result<Vec<DimensionNode>> {
        commands::reorder::run(&mut self.store, type_code, parent_id, node_ids, &self.actor)
    }

    pub fn delete_node(&mut self, type_code: &str, node_id: &NodeId) -> Result<()> {
        commands::delete::run(&mut self.store, type_code, node_id)
    }

    pub fn set_status(
        &mut self,
        type_code: &str,
        node_id: &NodeId,
        status: &str,
    ) -> Result<DimensionNode> {
        commands::status::run(&mut self.store, type_code, node_id, status, &self.actor)
    }

    // --- Tree queries ---

    pub fn get_nodes(&self, type_code: &str, include_inactive: bool) -> Result<Vec<DimensionNode>> {
        commands::get::nodes(&self.store, type_code, include_inactive)
    }

    pub fn get_tree(&self, type_code: &str, include_inactive: bool) -> Result<Vec<DimensionNode>> {
        commands::get::tree(&self.store, type_code, include_inactive)
    }

    pub fn search(
        &self,
        type_code: &str,
        query: Option<&str>,
        include_inactive: bool,
    ) -> Result<Vec<DimensionNode>> {
        commands::get::search(&self.store, type_code, query, include_inactive)
    }

    pub fn get_node(&self, type_code: &str, node_id: &NodeId) -> Result<DimensionNode> {
        commands::get::node(&self.store, type_code, node_id)
    }

    /// Resolve a node id or code, as typed by a user, within a type.
    pub fn lookup(&self, type_code: &str, selector: &str) -> Result<DimensionNode> {
        commands::get::lookup(&self.store, type_code, selector)
    }

    pub fn children(
        &self,
        type_code: &str,
        parent_id: Option<&NodeId>,
    ) -> Result<Vec<DimensionNode>> {
        commands::get::children(&self.store, type_code, parent_id)
    }

    // --- Maintenance ---

    pub fn seed(&mut self) -> Result<CmdResult> {
        commands::seed::run(&mut self.store, &self.actor)
    }

    pub fn doctor(&mut self, type_code: Option<&str>) -> Result<CmdResult> {
        commands::doctor::run(&mut self.store, type_code, &self.actor)
    }
}

pub use commands::{CmdMessage, CmdResult, MessageLevel};
