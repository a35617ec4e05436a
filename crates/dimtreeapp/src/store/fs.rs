use super::dim_store::DimStore;
use super::fs_backend::FsBackend;
use std::path::{Path, PathBuf};

pub type FileStore = DimStore<FsBackend>;

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        DimStore::with_backend(FsBackend::new(data_dir))
    }

    pub fn data_dir(&self) -> &Path {
        self.backend.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{DimensionNode, DimensionType, TypeSpec};
    use crate::store::lock::StoreLock;
    use crate::store::DataStore;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        (dir, store)
    }

    #[test]
    fn empty_directory_reads_as_empty_store() {
        let (_dir, store) = setup();
        assert!(store.list_types().unwrap().is_empty());
        assert!(store.list_nodes("FUND", None).unwrap().is_empty());
        assert!(!store.data_dir().exists());
    }

    #[test]
    fn records_survive_reopening() {
        let (_dir, mut store) = setup();
        let dim_type = DimensionType::from_spec(TypeSpec::new("FUND", "Fund", 4), "tester");
        store.insert_type(&dim_type).unwrap();

        let root = DimensionNode::new("FUND", "GEN", "General", None, 1, "tester");
        let child = DimensionNode::new("FUND", "GEN-1", "General 1", Some(&root), 1, "tester");
        store.commit_nodes(&[root.clone(), child.clone()]).unwrap();

        let reopened = FileStore::new(store.data_dir().to_path_buf());
        assert_eq!(reopened.find_type("FUND").unwrap().unwrap().name, "Fund");
        let loaded = reopened.find_node(&child.id).unwrap().unwrap();
        assert_eq!(loaded.path, child.path);
        assert_eq!(loaded.version, 1);
        assert!(store.data_dir().join("types.json").exists());
        assert!(store.data_dir().join("nodes.json").exists());
    }

    #[test]
    fn commit_leaves_no_temp_files() {
        let (_dir, mut store) = setup();
        let node = DimensionNode::new("FUND", "GEN", "General", None, 1, "tester");
        store.commit_nodes(&[node]).unwrap();

        let leftovers: Vec<_> = fs::read_dir(store.data_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn commit_is_refused_while_another_writer_holds_the_lock() {
        let (_dir, mut store) = setup();
        let _held = StoreLock::acquire(store.data_dir()).unwrap();

        let node = DimensionNode::new("FUND", "GEN", "General", None, 1, "tester");
        let err = store.commit_nodes(&[node]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn corrupt_node_file_is_a_serialization_error() {
        let (_dir, store) = setup();
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(store.data_dir().join("nodes.json"), "{ not json").unwrap();

        let err = store.list_nodes("FUND", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
