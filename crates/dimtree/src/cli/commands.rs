//! # CLI Layer
//!
//! This module is **one possible UI client** for dimtree, not the application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs a `tracing` subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Resolve the data directory, load config, build the API
//! 3. **Dispatch**: Route commands to `DimApi` methods ([`execute`])
//! 4. **Output Formatting**: Text or JSON via `render`
//!
//! Error reporting and exit codes live in `main.rs` via [`exit_code`].

use super::render;
use super::setup::{Cli, Commands, NodeCommands, OutputMode, TypeCommands, TypeFields};
use anyhow::Context;
use clap::Parser;
use dimtreeapp::api::{CmdResult, DimApi};
use dimtreeapp::config::DimtreeConfig;
use dimtreeapp::error::{DimError, ErrorKind};
use dimtreeapp::init::initialize;
use dimtreeapp::model::{Attributes, DimensionType, EntryBehavior, NodeId, NodeSpec, TypeSpec};
use dimtreeapp::store::DataStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DIMTREE_LOG";

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut ctx = initialize(cli.data.clone()).context("could not open the data directory")?;
    tracing::debug!(data_dir = %ctx.data_dir.display(), "dimtree starting");

    let out = execute(&mut ctx.api, &ctx.config, cli.command, cli.output)?;
    if !out.is_empty() {
        println!("{}", out);
    }
    Ok(())
}

/// Map an error to the process exit status: one code per library error kind.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<DimError>().map(DimError::kind) {
        Some(ErrorKind::NotFound) => 2,
        Some(ErrorKind::Conflict) => 3,
        Some(ErrorKind::Validation) => 4,
        _ => 1,
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

/// Run one parsed command against an API and return what should be printed.
pub fn execute<S: DataStore>(
    api: &mut DimApi<S>,
    config: &DimtreeConfig,
    command: Commands,
    mode: OutputMode,
) -> anyhow::Result<String> {
    match command {
        Commands::Type(cmd) => type_command(api, config, cmd, mode),
        Commands::Node(cmd) => node_command(api, cmd, mode),
        Commands::Tree { type_code, all } => {
            let nodes = api.get_tree(&type_code, all)?;
            emit(mode, &nodes, |n| render::tree(n))
        }
        Commands::Search {
            type_code,
            query,
            all,
        } => {
            let hits = api.search(&type_code, query.as_deref(), all)?;
            emit(mode, &hits, |n| render::node_list(n))
        }
        Commands::Seed => {
            let result = api.seed()?;
            emit_result(mode, &result)
        }
        Commands::Doctor { type_code } => {
            let result = api.doctor(type_code.as_deref())?;
            emit_result(mode, &result)
        }
    }
}

fn type_command<S: DataStore>(
    api: &mut DimApi<S>,
    config: &DimtreeConfig,
    cmd: TypeCommands,
    mode: OutputMode,
) -> anyhow::Result<String> {
    match cmd {
        TypeCommands::Create { code, name, fields } => {
            let mut spec = TypeSpec::new(
                code,
                name,
                fields.max_depth.unwrap_or(config.default_max_depth),
            );
            spec.description = fields.description;
            spec.hierarchical = !fields.flat;
            if let Some(entry) = fields.entry_behavior.as_deref() {
                spec.entry_behavior = entry.parse::<EntryBehavior>()?;
            }
            let created = api.create_type(&spec)?;
            emit(mode, &created, |t| format!("Created type {}", render::type_line(t)))
        }
        TypeCommands::Update {
            code,
            name,
            hierarchical,
            fields,
        } => {
            let current = api.get_type(&code)?;
            let spec = merge_type(current, name, hierarchical, fields)?;
            let updated = api.update_type(&code, &spec)?;
            emit(mode, &updated, |t| format!("Updated type {}", render::type_line(t)))
        }
        TypeCommands::Get { code } => {
            let dim_type = api.get_type(&code)?;
            emit(mode, &dim_type, render::type_detail)
        }
        TypeCommands::List => {
            let all = api.list_types()?;
            emit(mode, &all, |t| render::types(t))
        }
    }
}

/// Overlay the flags a user gave onto the stored type.
fn merge_type(
    current: DimensionType,
    name: Option<String>,
    hierarchical: bool,
    fields: TypeFields,
) -> anyhow::Result<TypeSpec> {
    let entry_behavior = match fields.entry_behavior.as_deref() {
        Some(entry) => entry.parse::<EntryBehavior>()?,
        None => current.entry_behavior,
    };
    Ok(TypeSpec {
        code: current.code,
        name: name.unwrap_or(current.name),
        description: fields.description.or(current.description),
        hierarchical: if fields.flat {
            false
        } else {
            hierarchical || current.hierarchical
        },
        max_depth: fields.max_depth.unwrap_or(current.max_depth),
        entry_behavior,
    })
}

fn node_command<S: DataStore>(
    api: &mut DimApi<S>,
    cmd: NodeCommands,
    mode: OutputMode,
) -> anyhow::Result<String> {
    match cmd {
        NodeCommands::Create {
            type_code,
            code,
            name,
            parent,
            description,
            sort_order,
            attrs,
        } => {
            let parent_id = resolve_opt(api, &type_code, parent.as_deref())?;
            let mut spec = NodeSpec::new(code, name).with_parent(parent_id);
            spec.description = description;
            spec.sort_order = sort_order;
            if !attrs.is_empty() {
                spec.attributes = Some(attrs.into_iter().collect());
            }
            let created = api.create_node(&type_code, &spec)?;
            emit(mode, &created, |n| format!("Created {}", render::node_detail(n)))
        }
        NodeCommands::Update {
            type_code,
            node,
            code,
            name,
            description,
            clear_description,
            parent,
            root,
            sort_order,
            attrs,
            clear_attrs,
        } => {
            let current = api.lookup(&type_code, &node)?;
            let parent_id = if root {
                None
            } else if let Some(selector) = parent.as_deref() {
                Some(api.lookup(&type_code, selector)?.id)
            } else {
                current.parent_id
            };
            let mut attributes: Attributes = if clear_attrs {
                Attributes::new()
            } else {
                current.attributes.clone()
            };
            attributes.extend(attrs);

            let spec = NodeSpec {
                code: code.unwrap_or_else(|| current.code.clone()),
                name: name.unwrap_or_else(|| current.name.clone()),
                description: if clear_description {
                    None
                } else {
                    description.or_else(|| current.description.clone())
                },
                parent_id,
                sort_order,
                attributes: Some(attributes),
            };
            let updated = api.update_node(&type_code, &current.id, &spec)?;
            emit(mode, &updated, |n| format!("Updated {}", render::node_detail(n)))
        }
        NodeCommands::Move {
            type_code,
            node,
            parent,
        } => {
            let id = api.lookup(&type_code, &node)?.id;
            let parent_id = resolve_opt(api, &type_code, parent.as_deref())?;
            let nodes = api.move_node(&type_code, &id, parent_id.as_ref())?;
            emit(mode, &nodes, |n| render::tree(n))
        }
        NodeCommands::Reorder {
            type_code,
            parent,
            nodes,
        } => {
            let parent_id = resolve_opt(api, &type_code, parent.as_deref())?;
            let ids = nodes
                .iter()
                .map(|selector| api.lookup(&type_code, selector).map(|n| n.id))
                .collect::<Result<Vec<NodeId>, _>>()?;
            let reordered = api.reorder(&type_code, parent_id.as_ref(), &ids)?;
            emit(mode, &reordered, |n| render::node_list(n))
        }
        NodeCommands::Delete { type_code, node } => {
            let target = api.lookup(&type_code, &node)?;
            api.delete_node(&type_code, &target.id)?;
            emit(mode, &target, |n| format!("Deleted {} {}", n.code, n.name))
        }
        NodeCommands::Status {
            type_code,
            node,
            status,
        } => {
            let id = api.lookup(&type_code, &node)?.id;
            let updated = api.set_status(&type_code, &id, &status)?;
            emit(mode, &updated, |n| format!("{} is now {}", n.code, n.status))
        }
        NodeCommands::Get { type_code, node } => {
            let found = api.lookup(&type_code, &node)?;
            emit(mode, &found, render::node_detail)
        }
        NodeCommands::Children { type_code, parent } => {
            let parent_id = resolve_opt(api, &type_code, parent.as_deref())?;
            let kids = api.children(&type_code, parent_id.as_ref())?;
            emit(mode, &kids, |n| render::node_list(n))
        }
        NodeCommands::List { type_code, all } => {
            let nodes = api.get_nodes(&type_code, all)?;
            emit(mode, &nodes, |n| render::node_list(n))
        }
    }
}

fn resolve_opt<S: DataStore>(
    api: &DimApi<S>,
    type_code: &str,
    selector: Option<&str>,
) -> anyhow::Result<Option<NodeId>> {
    Ok(match selector {
        Some(selector) => Some(api.lookup(type_code, selector)?.id),
        None => None,
    })
}

fn emit<T: Serialize + ?Sized>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match mode {
        OutputMode::Json => Ok(render::json(value)?),
        OutputMode::Text => Ok(text(value)),
    }
}

fn emit_result(mode: OutputMode, result: &CmdResult) -> anyhow::Result<String> {
    emit(mode, result, |r| render::messages(&r.messages))
}
