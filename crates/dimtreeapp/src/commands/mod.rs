//! # Command Layer
//!
//! This module contains the **core business logic** of dimtree. Each operation lives in
//! its own submodule as plain functions generic over [`DataStore`](crate::store::DataStore).
//!
//! ## Role and Responsibilities
//!
//! Commands are where the real work happens:
//! - Resolve the dimension type once per call and validate against it
//! - Maintain the tree invariants (`path`, `depth`, `max_depth`, unique codes, no cycles)
//! - Assemble every write of an operation into one store commit
//! - Are completely UI-agnostic
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O** beyond the store: no stdout, stderr or terminal concerns
//! - **Argument parsing**: that's the CLI layer's job
//! - **Exit codes**: return `Result`, let the caller decide
//!
//! ## Validate, Then Commit
//!
//! Every mutating command follows the same shape:
//!
//! 1. Load what it needs (type, node, parent, siblings, descendants).
//! 2. Compute the complete post-operation records in memory, validating each.
//! 3. Hand them to [`DataStore::commit_nodes`](crate::store::DataStore::commit_nodes)
//!    as a single batch.
//!
//! Nothing is written until step 3, and step 3 is all-or-nothing, so a failed
//! operation never leaves a partially rewritten subtree behind.
//!
//! ## Returns
//!
//! Tree operations return the records they produced (`DimensionNode`,
//! `Vec<DimensionNode>`, `DimensionType`). Maintenance commands (`seed`,
//! `doctor`) return a [`CmdResult`] carrying what they touched plus
//! leveled messages for the UI to render.
//!
//! ## Testing Strategy
//!
//! Command tests use `InMemoryStore` and cover every branch and error kind.
//!
//! ## Command Modules
//!
//! - [`types`]: Type Registry (create, update, get, list)
//! - [`create`]: Create nodes
//! - [`update`]: Update nodes, re-parenting with cascade
//! - [`move_node`]: Re-parent a node, placing it last among its new siblings
//! - [`reorder`]: Rewrite sibling `sort_order`
//! - [`delete`]: Delete childless nodes
//! - [`status`]: Activate / deactivate nodes
//! - [`get`]: Listings, tree, search, single lookups
//! - [`seed`]: Install the standard catalog
//! - [`doctor`]: Recompute paths and depths from parent links
//! - [`helpers`]: Shared resolution and cascade logic

use crate::model::{DimensionNode, DimensionType};
use serde::Serialize;

pub mod create;
pub mod delete;
pub mod doctor;
pub mod get;
pub mod helpers;
pub mod move_node;
pub mod reorder;
pub mod seed;
pub mod status;
pub mod types;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    pub affected_types: Vec<DimensionType>,
    pub affected_nodes: Vec<DimensionNode>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }
}
