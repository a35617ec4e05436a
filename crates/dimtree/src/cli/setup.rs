use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// Styled, human-readable output
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "dimtree",
    bin_name = "dimtree",
    version,
    disable_help_subcommand = true,
    after_help = "Nodes can be addressed by UUID or by code.\nData directory: --data, then $DIMTREE_DATA, then the OS data dir."
)]
#[command(about = "Hierarchical dimension catalogs for financial reference data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (overrides DIMTREE_DATA)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Text, help_heading = "Options")]
    pub output: OutputMode,

    /// Log more (-v info, -vv debug, -vvv trace). DIMTREE_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage dimension types
    #[command(subcommand, display_order = 1)]
    Type(TypeCommands),

    /// Manage nodes within a dimension type
    #[command(subcommand, display_order = 2)]
    Node(NodeCommands),

    /// Show a dimension as an indented tree
    #[command(display_order = 3)]
    Tree {
        type_code: String,

        /// Include inactive nodes
        #[arg(long)]
        all: bool,
    },

    /// Find nodes by code or name
    #[command(display_order = 4)]
    Search {
        type_code: String,

        /// Case-insensitive substring; omitted matches everything
        query: Option<String>,

        /// Include inactive nodes
        #[arg(long)]
        all: bool,
    },

    /// Load the standard dimension types into an empty store
    #[command(display_order = 10)]
    Seed,

    /// Check stored paths and depths, repairing what can be repaired
    #[command(display_order = 11)]
    Doctor {
        /// Limit the check to one type
        type_code: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TypeCommands {
    /// Register a new dimension type
    Create {
        code: String,
        name: String,

        #[command(flatten)]
        fields: TypeFields,
    },

    /// Change a dimension type; unspecified fields keep their values
    Update {
        code: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// Mark the type hierarchical again
        #[arg(long, conflicts_with = "flat")]
        hierarchical: bool,

        #[command(flatten)]
        fields: TypeFields,
    },

    /// Show one dimension type
    Get { code: String },

    /// List all dimension types
    #[command(alias = "ls")]
    List,
}

#[derive(Args, Debug, Default)]
pub struct TypeFields {
    #[arg(long)]
    pub description: Option<String>,

    /// Deepest allowed level (roots are depth 0)
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Mark the type as flat
    #[arg(long)]
    pub flat: bool,

    /// REQUIRED, OPTIONAL or DERIVED
    #[arg(long)]
    pub entry_behavior: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Add a node
    #[command(alias = "n")]
    Create {
        type_code: String,
        code: String,
        name: String,

        /// Parent node (id or code); omitted creates a root
        #[arg(long, short = 'p')]
        parent: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Position among siblings; defaults to last
        #[arg(long)]
        sort_order: Option<u32>,

        /// Attribute as key=value (value parsed as JSON, else text)
        #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
        attrs: Vec<(String, Value)>,
    },

    /// Change a node; unspecified fields keep their values
    Update {
        type_code: String,
        node: String,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        /// New parent (id or code)
        #[arg(long, short = 'p', conflicts_with = "root")]
        parent: Option<String>,

        /// Make the node a root
        #[arg(long)]
        root: bool,

        #[arg(long)]
        sort_order: Option<u32>,

        /// Set an attribute as key=value
        #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
        attrs: Vec<(String, Value)>,

        /// Drop all existing attributes first
        #[arg(long)]
        clear_attrs: bool,
    },

    /// Re-parent a node with its whole subtree
    #[command(alias = "mv")]
    Move {
        type_code: String,
        node: String,

        /// New parent (id or code); omitted moves to the root level
        #[arg(long, short = 'p')]
        parent: Option<String>,
    },

    /// Set the order of all children of one parent
    Reorder {
        type_code: String,

        /// Parent whose children are reordered; omitted reorders roots
        #[arg(long, short = 'p')]
        parent: Option<String>,

        /// Every sibling, in the desired order
        #[arg(required = true, num_args = 1..)]
        nodes: Vec<String>,
    },

    /// Delete a leaf node
    #[command(alias = "rm")]
    Delete { type_code: String, node: String },

    /// Set a node Active or Inactive
    Status {
        type_code: String,
        node: String,
        status: String,
    },

    /// Show one node
    Get { type_code: String, node: String },

    /// List direct children
    Children {
        type_code: String,

        /// Parent node; omitted lists roots
        #[arg(long, short = 'p')]
        parent: Option<String>,
    },

    /// List nodes flat, in tree order
    #[command(alias = "ls")]
    List {
        type_code: String,

        /// Include inactive nodes
        #[arg(long)]
        all: bool,
    },
}

/// Parse `key=value`. The value is read as JSON when it parses, text otherwise.
pub fn parse_attr(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{}\"", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("attribute key must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
