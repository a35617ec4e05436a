//! # CLI Behavior
//!
//! This is **one possible UI client** for dimtree, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## Addressing Nodes
//!
//! The library works on node UUIDs. The CLI also accepts a node's code
//! wherever it takes a node (`dimtree node get COST_CENTER CC-SCI`), resolved
//! within the given type. Type codes and node codes are case-insensitive.
//!
//! ## Partial Updates
//!
//! `DimApi::update_node` and `update_type` replace the whole record. The CLI
//! reads the current record first and overlays only the flags that were given,
//! so `dimtree node update CC X --name "New"` leaves the parent, description
//! and attributes alone.
//!
//! ## Output
//!
//! `--output text` (default) prints trees indented by depth. `--output json`
//! prints the library records as-is, for scripts.
//!
//! ## Module Structure
//!
//! - `commands`: Context setup, dispatch, exit codes
//! - `render`: Output formatting
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styling

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::{exit_code, run};
pub use render::error_line;
