use crate::error::Result;
use crate::model::{DimensionNode, NodeId};
use crate::store::DataStore;
use tracing::info;

use super::helpers::{get_node_checked, next_sort_order, relocate, resolve_parent, resolve_type};

/// Re-parent a node (`None` = root), placing it last among its new siblings.
///
/// Returns the full tree of the type afterwards, inactive nodes included.
pub fn run<S: DataStore>(
    store: &mut S,
    type_code: &str,
    node_id: &NodeId,
    new_parent_id: Option<&NodeId>,
    actor: &str,
) -> Result<Vec<DimensionNode>> {
    let dim_type = resolve_type(store, type_code)?;
    let mut node = get_node_checked(store, &dim_type, node_id)?;
    let new_parent = resolve_parent(store, &dim_type, new_parent_id)?;

    let descendants = relocate(store, &dim_type, &mut node, new_parent.as_ref(), actor)?;
    node.sort_order = next_sort_order(store, &dim_type.code, new_parent_id, Some(&node.id))?;
    node.touch(actor);

    let moved = descendants.len();
    let mut batch = Vec::with_capacity(moved + 1);
    batch.push(node);
    batch.extend(descendants);
    store.commit_nodes(&batch)?;

    info!(
        "Moved {} node {} to depth {} ({} descendant(s) rebased)",
        dim_type.code, batch[0].code, batch[0].depth, moved
    );
    store.list_nodes(&dim_type.code, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::memory::fixtures::StoreFixture;

    const CC: &str = "COST_CENTER";

    fn abc() -> StoreFixture {
        StoreFixture::new()
            .with_type(CC, 3)
            .with_chain(CC, &["A", "B", "C"])
    }

    #[test]
    fn moving_ancestor_under_descendant_is_cycle() {
        let mut fixture = abc();
        let a = fixture.id(CC, "A");
        let c = fixture.id(CC, "C");
        let before = fixture.store.list_nodes(CC, None).unwrap();

        let err = run(&mut fixture.store, CC, &a, Some(&c), "t").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("cycle"));
        assert_eq!(fixture.store.list_nodes(CC, None).unwrap(), before);
    }

    #[test]
    fn moving_to_root_rebases_subtree() {
        let mut fixture = abc();
        let a = fixture.node(CC, "A");
        let b = fixture.node(CC, "B");
        let c = fixture.node(CC, "C");

        let tree = run(&mut fixture.store, CC, &b.id, None, "t").unwrap();
        assert_eq!(tree.len(), 3);

        let b_after = fixture.node(CC, "B");
        let c_after = fixture.node(CC, "C");
        assert_eq!(b_after.depth, 0);
        assert_eq!(b_after.path, b.id.to_string());
        assert_eq!(c_after.depth, 1);
        assert_eq!(c_after.path, format!("{}/{}", b.id, c.id));
        assert_eq!(fixture.node(CC, "A"), a);
    }

    #[test]
    fn moved_node_goes_last_among_new_siblings() {
        let mut fixture = StoreFixture::new()
            .with_type(CC, 3)
            .with_chain(CC, &["P"])
            .with_siblings(CC, Some("P"), "K", 3)
            .with_chain(CC, &["Q"]);
        let p = fixture.id(CC, "P");
        let q = fixture.id(CC, "Q");

        run(&mut fixture.store, CC, &q, Some(&p), "t").unwrap();
        let kids: Vec<String> = fixture
            .store
            .children(CC, Some(&p))
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        assert_eq!(kids, vec!["K1", "K2", "K3", "Q"]);
        assert_eq!(fixture.node(CC, "Q").sort_order, 4);
    }

    #[test]
    fn moving_within_same_parent_sends_node_last() {
        let mut fixture = StoreFixture::new()
            .with_type(CC, 3)
            .with_siblings(CC, None, "R", 3);
        let r1 = fixture.id(CC, "R1");

        run(&mut fixture.store, CC, &r1, None, "t").unwrap();
        assert_eq!(fixture.node(CC, "R1").sort_order, 4);

        // Already last: keeps a slot after the others rather than growing
        run(&mut fixture.store, CC, &r1, None, "t").unwrap();
        assert_eq!(fixture.node(CC, "R1").sort_order, 4);
    }

    #[test]
    fn move_returns_inactive_nodes_too() {
        let mut fixture = abc();
        let c = fixture.node(CC, "C");
        let mut inactive = c.clone();
        inactive.status = crate::model::NodeStatus::Inactive;
        fixture.store.commit_nodes(&[inactive]).unwrap();

        let b = fixture.id(CC, "B");
        let tree = run(&mut fixture.store, CC, &b, None, "t").unwrap();
        assert!(tree.iter().any(|n| n.code == "C" && !n.is_active()));
    }

    #[test]
    fn depth_limit_applies_to_moved_subtree() {
        let mut fixture = abc().with_chain(CC, &["X", "Y"]);
        let a = fixture.id(CC, "A");
        let y = fixture.id(CC, "Y");
        let err = run(&mut fixture.store, CC, &a, Some(&y), "t").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fixture.node(CC, "C").depth, 2);
    }
}
