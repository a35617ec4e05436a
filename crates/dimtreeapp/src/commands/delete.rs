use crate::error::Result;
use crate::model::NodeId;
use crate::store::DataStore;
use tracing::info;

use super::helpers::{get_node_checked, resolve_type};

/// Remove a childless node. Its code becomes available again.
pub fn run<S: DataStore>(store: &mut S, type_code: &str, node_id: &NodeId) -> Result<()> {
    let dim_type = resolve_type(store, type_code)?;
    let node = get_node_checked(store, &dim_type, node_id)?;
    store.remove_node(&node)?;
    info!("Deleted {} node {}", dim_type.code, node.code);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::error::ErrorKind;
    use crate::model::NodeSpec;
    use crate::store::memory::fixtures::StoreFixture;

    const CC: &str = "COST_CENTER";

    #[test]
    fn delete_with_children_is_conflict() {
        let mut fixture = StoreFixture::new()
            .with_type(CC, 3)
            .with_chain(CC, &["A", "B"]);
        let a = fixture.id(CC, "A");

        let err = run(&mut fixture.store, CC, &a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(fixture.store.find_node(&a).unwrap().is_some());
    }

    #[test]
    fn childless_delete_frees_the_code() {
        let mut fixture = StoreFixture::new()
            .with_type(CC, 3)
            .with_chain(CC, &["A", "B"]);
        let b = fixture.id(CC, "B");
        let a = fixture.id(CC, "A");

        run(&mut fixture.store, CC, &b).unwrap();
        assert!(fixture.store.find_node(&b).unwrap().is_none());

        let again = create::run(&mut fixture.store, CC, &NodeSpec::new("B", "B").under(a), "t").unwrap();
        assert_ne!(again.id, b);

        // A is a leaf again only after its new child goes
        run(&mut fixture.store, CC, &again.id).unwrap();
        run(&mut fixture.store, CC, &a).unwrap();
        assert!(fixture.store.list_nodes(CC, None).unwrap().is_empty());
    }

    #[test]
    fn unknown_node_is_not_found() {
        let mut fixture = StoreFixture::new().with_type(CC, 3);
        let err = run(&mut fixture.store, CC, &uuid::Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn node_of_another_type_is_validation() {
        let mut fixture = StoreFixture::new()
            .with_type(CC, 3)
            .with_type("FUND", 3)
            .with_chain("FUND", &["F"]);
        let f = fixture.id("FUND", "F");
        let err = run(&mut fixture.store, CC, &f).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
