//! # dimtree CLI Architecture
//!
//! dimtree ships with a command line client, but the binary is intentionally thin:
//! the CLI lives in `src/cli/`, while this file only invokes `cli::run()` and
//! handles process termination.
//!
//! ## Workspace Structure
//!
//! dimtree is organized as a Cargo workspace with two crates:
//! - `crates/dimtreeapp/`: Core library with UI-agnostic business logic
//! - `crates/dimtree/`: This CLI tool, depends on the `dimtreeapp` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/dimtree/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Text / JSON rendering (render.rs, styles.rs)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/dimtreeapp/src/api.rs)                   │
//! │  - Dispatches to command modules, stamps the actor          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/dimtreeapp/src/commands/*)           │
//! │  - Validation, path maintenance, atomic commits             │
//! │  - No knowledge of stdout/stderr or process exits           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Other failure (I/O, corrupt data, bad config) |
//! | 2 | Not found (also clap usage errors) |
//! | 3 | Conflict (duplicate code, stale write, node has children) |
//! | 4 | Validation (depth, cycle, bad input) |
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests beside each command plus `FileStore` integration tests.
//! - **CLI dispatch (`cli/commands.rs`)**: parses argument vectors and runs them
//!   against an in-memory API.
//! - **End to end (`tests/`)**: runs the built binary on a temp data directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", cli::error_line(&e));
        std::process::exit(cli::exit_code(&e));
    }
}
