use crate::api::DimApi;
use crate::store::fs::FileStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub api: DimApi<FileStore>,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().join("data");
        let api = DimApi::new(FileStore::new(root.clone())).with_actor("test");
        Self {
            _temp_dir: temp_dir,
            api,
            root,
        }
    }

    /// A second handle on the same data directory, as another process would see it.
    pub fn reopen(&self) -> DimApi<FileStore> {
        DimApi::new(FileStore::new(self.root.clone())).with_actor("other")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeSpec, TypeSpec};

    #[test]
    fn reopened_handle_sees_committed_writes() {
        let mut env = TestEnv::new();
        env.api.create_type(&TypeSpec::new("FUND", "Fund", 3)).unwrap();
        let node = env.api.create_node("FUND", &NodeSpec::new("GEN", "General")).unwrap();

        let other = env.reopen();
        assert_eq!(other.get_node("FUND", &node.id).unwrap(), node);
    }
}
