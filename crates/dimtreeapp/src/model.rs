//! # Domain Model: Dimension Types and Nodes
//!
//! This module defines the records dimtree persists: [`DimensionType`] (the
//! per-catalog configuration) and [`DimensionNode`] (one entry of a catalog).
//!
//! ## Flat Records, Derived Structure
//!
//! Nodes never embed other nodes. A node points at its parent through
//! `parent_id` and carries two derived fields:
//!
//! ```text
//! path   = "<root-id>/<child-id>/.../<own-id>"   (own id alone for a root)
//! depth  = number of ancestors in `path`         (0 for a root)
//! ```
//!
//! The materialized `path` turns "all descendants of X" into a prefix match on
//! `X.path + "/"`, at the cost of rewriting every descendant when X moves.
//! See [`crate::tree`] for the path algebra.
//!
//! ## Codes
//!
//! Type codes and node codes are compared in normalized form: trimmed and
//! uppercased ([`normalize_code`]). `" cc-sci "` and `"CC-SCI"` are the same code.
//!
//! ## Versions
//!
//! Every node carries a `version` that the store bumps on each committed write.
//! A node read at version N can only be written back while the store still holds
//! version N; anything else is a concurrent modification and is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{DimError, Result};

pub type NodeId = Uuid;

/// Open key/value bag carried by nodes.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// How a dimension is filled in on financial transactions.
/// Consumed by transaction-entry code outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryBehavior {
    Required,
    Optional,
    Derived,
}

impl EntryBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "REQUIRED",
            Self::Optional => "OPTIONAL",
            Self::Derived => "DERIVED",
        }
    }
}

impl fmt::Display for EntryBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryBehavior {
    type Err = DimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REQUIRED" => Ok(Self::Required),
            "OPTIONAL" => Ok(Self::Optional),
            "DERIVED" => Ok(Self::Derived),
            other => Err(DimError::validation(format!(
                "Entry behavior must be REQUIRED, OPTIONAL or DERIVED (got \"{}\")",
                other
            ))),
        }
    }
}

/// Soft lifecycle state shared by types and nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeStatus {
    #[default]
    Active,
    Inactive,
}

impl NodeStatus {
    /// Parses a status token case-insensitively.
    ///
    /// ```
    /// use dimtreeapp::model::NodeStatus;
    ///
    /// assert_eq!(NodeStatus::parse("inactive").unwrap(), NodeStatus::Inactive);
    /// assert_eq!(NodeStatus::parse("ACTIVE").unwrap(), NodeStatus::Active);
    /// assert!(NodeStatus::parse("archived").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        if token.eq_ignore_ascii_case("active") {
            Ok(Self::Active)
        } else if token.eq_ignore_ascii_case("inactive") {
            Ok(Self::Inactive)
        } else {
            Err(DimError::validation("Status must be Active or Inactive"))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and uppercase a type or node code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Configuration record for one hierarchical catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionType {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub hierarchical: bool,
    pub max_depth: u32,
    pub entry_behavior: EntryBehavior,
    #[serde(default)]
    pub status: NodeStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl DimensionType {
    /// Build an Active type from an already-normalized spec.
    pub fn from_spec(spec: TypeSpec, actor: &str) -> Self {
        let now = Utc::now();
        Self {
            code: spec.code,
            name: spec.name,
            description: spec.description,
            hierarchical: spec.hierarchical,
            max_depth: spec.max_depth,
            entry_behavior: spec.entry_behavior,
            status: NodeStatus::Active,
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: actor.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

/// Input for registering or replacing a [`DimensionType`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub hierarchical: bool,
    pub max_depth: u32,
    pub entry_behavior: EntryBehavior,
}

impl TypeSpec {
    pub fn new(code: impl Into<String>, name: impl Into<String>, max_depth: u32) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            hierarchical: true,
            max_depth,
            entry_behavior: EntryBehavior::Optional,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_entry_behavior(mut self, entry_behavior: EntryBehavior) -> Self {
        self.entry_behavior = entry_behavior;
        self
    }

    pub fn flat(mut self) -> Self {
        self.hierarchical = false;
        self
    }
}

/// One entry in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionNode {
    pub id: NodeId,
    pub type_code: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub path: String,
    pub depth: u32,
    pub sort_order: u32,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub status: NodeStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    /// Optimistic-concurrency token. 0 means "never committed".
    #[serde(default)]
    pub version: u64,
}

impl DimensionNode {
    /// A fresh, uncommitted node placed under `parent` (or at the root).
    ///
    /// The id is generated here, so `path` and `depth` are final on return.
    pub fn new(
        type_code: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        parent: Option<&DimensionNode>,
        sort_order: u32,
        actor: &str,
    ) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            type_code: type_code.into(),
            code: code.into(),
            name: name.into(),
            description: None,
            parent_id: parent.map(|p| p.id),
            path: crate::tree::node_path(parent.map(|p| p.path.as_str()), &id),
            depth: parent.map(|p| p.depth + 1).unwrap_or(0),
            sort_order,
            attributes: Attributes::new(),
            status: NodeStatus::Active,
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: actor.to_string(),
            version: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }

    /// True if `self` sits somewhere below `ancestor` in the same tree.
    pub fn is_descendant_of(&self, ancestor: &DimensionNode) -> bool {
        self.type_code == ancestor.type_code && crate::tree::is_within(&self.path, &ancestor.path)
    }

    pub fn touch(&mut self, actor: &str) {
        self.updated_at = Utc::now();
        self.updated_by = actor.to_string();
    }
}

/// Input for creating or updating a [`DimensionNode`].
///
/// `parent_id = None` means "root". On update, `sort_order = None` keeps the
/// current value and `attributes = None` clears the bag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeSpec {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<NodeId>,
    pub sort_order: Option<u32>,
    pub attributes: Option<Attributes>,
}

impl NodeSpec {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_parent(mut self, parent_id: Option<NodeId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: u32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value);
        self
    }
}
