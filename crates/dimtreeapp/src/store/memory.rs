use super::dim_store::DimStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = DimStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        DimStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{DimensionNode, DimensionType, NodeId, TypeSpec};
    use crate::store::DataStore;

    const FIXTURE_ACTOR: &str = "fixture";

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_type(mut self, code: &str, max_depth: u32) -> Self {
            let dim_type = DimensionType::from_spec(TypeSpec::new(code, code, max_depth), FIXTURE_ACTOR);
            self.store.insert_type(&dim_type).unwrap();
            self
        }

        /// Add a chain of nodes, each one the child of the previous.
        /// The first code becomes a root.
        pub fn with_chain(mut self, type_code: &str, codes: &[&str]) -> Self {
            let mut parent: Option<DimensionNode> = None;
            for code in codes {
                let node =
                    DimensionNode::new(type_code, *code, *code, parent.as_ref(), 1, FIXTURE_ACTOR);
                let committed = self.store.commit_nodes(&[node]).unwrap();
                parent = committed.into_iter().next();
            }
            self
        }

        /// Add `count` siblings named `<prefix>1..` under the node with `parent_code`
        /// (or at the root when `None`).
        pub fn with_siblings(
            mut self,
            type_code: &str,
            parent_code: Option<&str>,
            prefix: &str,
            count: u32,
        ) -> Self {
            let parent = parent_code.map(|code| {
                self.store
                    .find_by_code(type_code, code)
                    .unwrap()
                    .expect("fixture parent exists")
            });
            let batch: Vec<DimensionNode> = (1..=count)
                .map(|i| {
                    let code = format!("{}{}", prefix, i);
                    DimensionNode::new(type_code, &code, &code, parent.as_ref(), i, FIXTURE_ACTOR)
                })
                .collect();
            self.store.commit_nodes(&batch).unwrap();
            self
        }

        pub fn node(&self, type_code: &str, code: &str) -> DimensionNode {
            self.store
                .find_by_code(type_code, code)
                .unwrap()
                .unwrap_or_else(|| panic!("fixture node {} missing", code))
        }

        pub fn id(&self, type_code: &str, code: &str) -> NodeId {
            self.node(type_code, code).id
        }
    }
}
