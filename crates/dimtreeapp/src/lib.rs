//! # dimtree Architecture
//!
//! dimtree maintains **hierarchical reference-data catalogs** (cost centers,
//! organizational units, funds, ...) that other systems tag transactions with.
//! It is a UI-agnostic library with a thin CLI client on top.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (dimtree crate)                                        │
//! │  - Parses arguments, renders trees, maps errors to exits    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, stamps the acting user        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Type Registry and Tree Service operations                │
//! │  - Validates everything, then commits one batch             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait, version-checked atomic commits          │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Materialized Paths
//!
//! Each node stores its full ancestor chain as a `path` of ids joined by `/`.
//! Finding a subtree is a prefix match; re-parenting rewrites the subtree's
//! paths in the same commit as the node itself. See [`tree`].
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments, returns Rust types and
//! never writes to stdout/stderr. Diagnostics go through `tracing`; installing
//! a subscriber is the binary's job.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: thorough unit tests against `InMemoryStore`.
//! 2. **API**: dispatch tests.
//! 3. **Store**: commit semantics against both backends.
//! 4. **Integration** (`tests/`): whole-tree invariants on a `FileStore`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`DimensionType`, `DimensionNode`)
//! - [`tree`]: Path algebra and tree ordering
//! - [`config`]: Configuration loading
//! - [`init`]: Data directory resolution
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod store;
pub mod tree;

#[cfg(test)]
pub mod test_utils;
