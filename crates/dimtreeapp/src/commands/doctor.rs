//! Explicit reconciliation of derived tree fields.
//!
//! `path` and `depth` are caches of what `parent_id` already says. If they ever
//! disagree (an interrupted external edit, a hand-written data file), `doctor`
//! recomputes them top-down from the parent links and commits the difference.
//!
//! Repairs, per type:
//!
//! - A parent id pointing at a missing node (or a node of another type) is an
//!   **orphan**: the node is re-rooted.
//! - Nodes caught in a parent cycle are re-rooted one at a time, lowest code
//!   first, until every node is reachable from a root.
//! - Every reachable node gets `path`/`depth` recomputed from its parent.
//!
//! Nodes deeper than the type's `max_depth` are reported but left in place.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{DimensionNode, DimensionType, NodeId};
use crate::store::DataStore;
use crate::tree;
use tracing::{info, warn};

use super::helpers::resolve_type;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DoctorReport {
    pub checked: usize,
    pub repaired: usize,
    pub orphans: usize,
    pub cycles_broken: usize,
    pub too_deep: usize,
}

/// Check one type, or every registered type when `type_code` is `None`.
pub fn run<S: DataStore>(store: &mut S, type_code: Option<&str>, actor: &str) -> Result<CmdResult> {
    let dim_types = match type_code {
        Some(code) => vec![resolve_type(store, code)?],
        None => store.list_types()?,
    };

    let mut result = CmdResult::default();
    let mut total = DoctorReport::default();

    for dim_type in &dim_types {
        let (report, repaired) = reconcile(store, dim_type, actor)?;
        if report.repaired > 0 {
            warn!(
                "doctor: repaired {} node(s) of type {} ({} orphan(s), {} cycle(s))",
                report.repaired, dim_type.code, report.orphans, report.cycles_broken
            );
            result.add_message(CmdMessage::warning(format!(
                "{}: repaired {} node(s) ({} orphan(s) re-rooted, {} cycle(s) broken)",
                dim_type.code, report.repaired, report.orphans, report.cycles_broken
            )));
        }
        if report.too_deep > 0 {
            result.add_message(CmdMessage::warning(format!(
                "{}: {} node(s) exceed max depth {}",
                dim_type.code, report.too_deep, dim_type.max_depth
            )));
        }
        result.affected_nodes.extend(repaired);

        total.checked += report.checked;
        total.repaired += report.repaired;
        total.orphans += report.orphans;
        total.cycles_broken += report.cycles_broken;
        total.too_deep += report.too_deep;
    }

    if total.repaired == 0 && total.too_deep == 0 {
        result.add_message(CmdMessage::success(format!(
            "No inconsistencies found ({} node(s) in {} type(s)).",
            total.checked,
            dim_types.len()
        )));
    }
    info!(
        "doctor: checked {} node(s), repaired {}",
        total.checked, total.repaired
    );
    Ok(result)
}

fn reconcile<S: DataStore>(
    store: &mut S,
    dim_type: &DimensionType,
    actor: &str,
) -> Result<(DoctorReport, Vec<DimensionNode>)> {
    let nodes = store.list_nodes(&dim_type.code, None)?;
    let mut report = DoctorReport {
        checked: nodes.len(),
        ..Default::default()
    };

    let by_id: HashMap<NodeId, DimensionNode> = nodes.into_iter().map(|n| (n.id, n)).collect();

    // Effective parent of every node after orphan repair.
    let mut parent_of: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    for node in by_id.values() {
        let parent = match node.parent_id {
            Some(pid) if pid != node.id && by_id.contains_key(&pid) => Some(pid),
            Some(_) => {
                report.orphans += 1;
                None
            }
            None => None,
        };
        parent_of.insert(node.id, parent);
    }

    let mut expected: HashMap<NodeId, (String, u32)> = HashMap::new();
    let mut pending: HashSet<NodeId> = by_id.keys().copied().collect();

    loop {
        let mut queue: VecDeque<NodeId> = pending
            .iter()
            .filter(|id| parent_of[*id].is_none())
            .copied()
            .collect();

        if queue.is_empty() {
            // Everything left hangs off a cycle; cut it at the lowest code.
            let Some(cut) = pending
                .iter()
                .min_by(|a, b| by_id[*a].code.cmp(&by_id[*b].code))
                .copied()
            else {
                break;
            };
            parent_of.insert(cut, None);
            report.cycles_broken += 1;
            continue;
        }

        while let Some(id) = queue.pop_front() {
            if !pending.remove(&id) {
                continue;
            }
            let (path, depth) = match parent_of[&id] {
                Some(pid) => {
                    let (parent_path, parent_depth) = &expected[&pid];
                    (tree::node_path(Some(parent_path.as_str()), &id), parent_depth + 1)
                }
                None => (tree::node_path(None, &id), 0),
            };
            expected.insert(id, (path, depth));
            queue.extend(
                pending
                    .iter()
                    .filter(|child| parent_of[*child] == Some(id))
                    .copied(),
            );
        }
    }

    let mut repaired = Vec::new();
    for (id, node) in &by_id {
        let (path, depth) = &expected[id];
        if *depth > dim_type.max_depth {
            report.too_deep += 1;
        }
        let parent = parent_of[id];
        if node.parent_id != parent || &node.path != path || node.depth != *depth {
            let mut fixed = node.clone();
            fixed.parent_id = parent;
            fixed.path = path.clone();
            fixed.depth = *depth;
            fixed.touch(actor);
            repaired.push(fixed);
        }
    }

    report.repaired = repaired.len();
    let committed = store.commit_nodes(&repaired)?;
    Ok((report, committed))
}
