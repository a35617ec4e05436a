//! # Rendering
//!
//! Turns library records into strings. Nothing here prints: `commands.rs`
//! decides where output goes.
//!
//! Text mode is for people: one line per record, trees indented by depth,
//! inactive entries struck through. JSON mode serializes the same records the
//! library returns, so scripts see `id`, `path` and `version` unchanged.

use super::styles::{paint, Role};
use dimtreeapp::api::{CmdMessage, MessageLevel};
use dimtreeapp::model::{DimensionNode, DimensionType};
use serde::Serialize;

const INDENT: &str = "  ";

pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn type_line(dim_type: &DimensionType) -> String {
    let shape = if dim_type.hierarchical {
        format!("max depth {}", dim_type.max_depth)
    } else {
        "flat".to_string()
    };
    let mut line = format!(
        "{}  {}  {}",
        paint(Role::Code, &dim_type.code),
        dim_type.name,
        paint(Role::Muted, format!("({}, {})", shape, dim_type.entry_behavior)),
    );
    if !dim_type.is_active() {
        line.push_str(&format!("  {}", paint(Role::Muted, dim_type.status)));
    }
    line
}

pub fn types(dim_types: &[DimensionType]) -> String {
    if dim_types.is_empty() {
        return paint(Role::Info, "No dimension types. Run `dimtree seed` to load the defaults.");
    }
    dim_types.iter().map(type_line).collect::<Vec<_>>().join("\n")
}

pub fn type_detail(dim_type: &DimensionType) -> String {
    let mut out = vec![type_line(dim_type)];
    if let Some(description) = &dim_type.description {
        out.push(paint(Role::Faint, description));
    }
    out.push(paint(
        Role::Muted,
        format!(
            "created {} by {}, updated {} by {}",
            dim_type.created_at.format("%Y-%m-%d %H:%M"),
            dim_type.created_by,
            dim_type.updated_at.format("%Y-%m-%d %H:%M"),
            dim_type.updated_by
        ),
    ));
    out.join("\n")
}

fn node_label(node: &DimensionNode) -> String {
    if node.is_active() {
        format!("{}  {}", paint(Role::Code, &node.code), paint(Role::Name, &node.name))
    } else {
        format!(
            "{}  {}",
            paint(Role::Inactive, &node.code),
            paint(Role::Inactive, &node.name)
        )
    }
}

/// Indented outline of nodes already in tree order.
pub fn tree(nodes: &[DimensionNode]) -> String {
    if nodes.is_empty() {
        return paint(Role::Info, "No nodes.");
    }
    nodes
        .iter()
        .map(|n| format!("{}{}", INDENT.repeat(n.depth as usize), node_label(n)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per node with its depth and position, no indentation.
pub fn node_list(nodes: &[DimensionNode]) -> String {
    if nodes.is_empty() {
        return paint(Role::Info, "No nodes.");
    }
    nodes
        .iter()
        .map(|n| {
            format!(
                "{}  {}",
                node_label(n),
                paint(Role::Faint, format!("depth {} #{}", n.depth, n.sort_order))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn node_detail(node: &DimensionNode) -> String {
    let mut out = vec![node_label(node)];
    if let Some(description) = &node.description {
        out.push(paint(Role::Faint, description));
    }
    let field = |label: &str, value: String| format!("{:>8}  {}", paint(Role::Heading, label), value);
    out.push(field("id", node.id.to_string()));
    out.push(field("type", node.type_code.clone()));
    out.push(field(
        "parent",
        node.parent_id
            .map(|p| p.to_string())
            .unwrap_or_else(|| "(root)".to_string()),
    ));
    out.push(field("path", node.path.clone()));
    out.push(field("depth", node.depth.to_string()));
    out.push(field("order", node.sort_order.to_string()));
    out.push(field("status", node.status.to_string()));
    for (key, value) in &node.attributes {
        out.push(field("attr", format!("{} = {}", key, value)));
    }
    out.push(paint(
        Role::Muted,
        format!(
            "updated {} by {} (version {})",
            node.updated_at.format("%Y-%m-%d %H:%M"),
            node.updated_by,
            node.version
        ),
    ));
    out.join("\n")
}

pub fn message(msg: &CmdMessage) -> String {
    match msg.level {
        MessageLevel::Info => paint(Role::Info, &msg.content),
        MessageLevel::Success => paint(Role::Success, &msg.content),
        MessageLevel::Warning => paint(Role::Warning, &msg.content),
    }
}

pub fn messages(msgs: &[CmdMessage]) -> String {
    msgs.iter().map(message).collect::<Vec<_>>().join("\n")
}

pub fn error_line(err: &impl std::fmt::Display) -> String {
    paint(Role::Error, format!("Error: {:#}", err))
}
