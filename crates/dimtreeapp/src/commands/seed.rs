//! Standard catalog installed into an empty store.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{EntryBehavior, NodeSpec, TypeSpec};
use crate::store::DataStore;
use tracing::info;

use super::{create, types};

const SEED_MAX_DEPTH: u32 = 6;

const SEED_TYPES: &[(&str, &str, &str, EntryBehavior)] = &[
    ("LEDGER_ACCOUNT", "Ledger Account", "Natural account structure", EntryBehavior::Required),
    ("SPEND_ITEM", "Spend Item", "Spend item catalog", EntryBehavior::Required),
    ("REVENUE_ITEM", "Revenue Item", "Revenue item catalog", EntryBehavior::Required),
    ("ORGANIZATION", "Organization", "Structural organization chart", EntryBehavior::Required),
    ("COST_CENTER", "Cost Center", "Budgetary responsibility centers", EntryBehavior::Required),
    ("PROGRAM", "Program", "Internal program grouping", EntryBehavior::Optional),
    ("FUNCTION", "Function", "NACUBO functional expense category", EntryBehavior::Derived),
    ("FUND", "Fund", "Funding source dimension", EntryBehavior::Derived),
    ("GIFT", "Gift", "Gift driver", EntryBehavior::Optional),
    ("GRANT", "Grant", "Grant driver", EntryBehavior::Optional),
    ("PROJECT", "Project", "Project driver", EntryBehavior::Optional),
    ("APPROPRIATION", "Appropriation", "Appropriation driver", EntryBehavior::Optional),
];

const SEED_ROOTS: &[(&str, &str, &str)] = &[
    ("ORGANIZATION", "ORG-ACA", "Academic Affairs"),
    ("COST_CENTER", "CC-SCI", "College of Science"),
    ("FUND", "FUND-GEN", "General Operating"),
    ("LEDGER_ACCOUNT", "6100", "Travel Expense"),
    ("SPEND_ITEM", "SP-TRAVEL", "Travel Booking"),
    ("REVENUE_ITEM", "RV-TUITION", "Tuition Revenue"),
    ("LEDGER_ACCOUNT", "4100", "Tuition Revenue"),
    ("PROGRAM", "PG-STEM", "STEM Excellence"),
    ("FUNCTION", "FN-INST", "Instruction"),
    ("GIFT", "GFT-100", "Alumni Gift"),
];

/// Register the standard dimension types and their example roots.
///
/// Does nothing if any type is already registered.
pub fn run<S: DataStore>(store: &mut S, actor: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if !store.list_types()?.is_empty() {
        result.add_message(CmdMessage::info(
            "Store already has dimension types, nothing seeded.",
        ));
        return Ok(result);
    }

    for (code, name, description, entry_behavior) in SEED_TYPES {
        let spec = TypeSpec::new(*code, *name, SEED_MAX_DEPTH)
            .with_description(*description)
            .with_entry_behavior(*entry_behavior);
        result.affected_types.push(types::create(store, &spec, actor)?);
    }

    for (type_code, code, name) in SEED_ROOTS {
        let node = create::run(store, type_code, &NodeSpec::new(*code, *name), actor)?;
        result.affected_nodes.push(node);
    }

    info!(
        "Seeded {} type(s) and {} node(s)",
        result.affected_types.len(),
        result.affected_nodes.len()
    );
    result.add_message(CmdMessage::success(format!(
        "Seeded {} dimension types and {} nodes.",
        result.affected_types.len(),
        result.affected_nodes.len()
    )));
    Ok(result)
}
