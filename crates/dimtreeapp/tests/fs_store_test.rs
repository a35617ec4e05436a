use dimtreeapp::model::{DimensionNode, DimensionType, TypeSpec};
use dimtreeapp::store::backend::StorageBackend;
use dimtreeapp::store::fs_backend::FsBackend;
use dimtreeapp::store::lock::StoreLock;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().to_path_buf());
    (dir, backend)
}

#[test]
fn test_fs_backend_empty_reads() {
    let (_dir, backend) = setup();
    assert!(backend.load_types().unwrap().is_empty());
    assert!(backend.load_nodes().unwrap().is_empty());
}

#[test]
fn test_fs_backend_round_trip_on_disk() {
    let (dir, backend) = setup();

    let dim_type = DimensionType::from_spec(TypeSpec::new("FUND", "Fund", 6), "test");
    let mut types = backend.load_types().unwrap();
    types.insert(dim_type.code.clone(), dim_type.clone());
    backend.save_types(&types).unwrap();

    let node = DimensionNode::new("FUND", "GEN", "General", None, 1, "test");
    let mut nodes = backend.load_nodes().unwrap();
    nodes.insert(node.id, node.clone());
    backend.save_nodes(&nodes).unwrap();

    // Pretty-printed JSON keyed by code / id
    let on_disk = fs::read_to_string(dir.path().join("types.json")).unwrap();
    assert!(on_disk.contains("\"FUND\": {"));
    let on_disk = fs::read_to_string(dir.path().join("nodes.json")).unwrap();
    assert!(on_disk.contains(&node.id.to_string()));

    assert_eq!(backend.load_types().unwrap()["FUND"], dim_type);
    assert_eq!(backend.load_nodes().unwrap()[&node.id], node);
}

#[test]
fn test_fs_backend_atomic_write_artifacts() {
    let (dir, backend) = setup();
    let node = DimensionNode::new("FUND", "GEN", "General", None, 1, "test");
    let mut nodes = backend.load_nodes().unwrap();
    nodes.insert(node.id, node);
    backend.save_nodes(&nodes).unwrap();

    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_backend_failed_rename_removes_tmp_file() {
    let (dir, backend) = setup();
    // A non-empty directory where nodes.json should be makes the rename fail
    fs::create_dir_all(dir.path().join("nodes.json").join("blocker")).unwrap();

    let node = DimensionNode::new("FUND", "GEN", "General", None, 1, "test");
    let mut nodes = backend.load_nodes().unwrap_or_default();
    nodes.insert(node.id, node);
    assert!(backend.save_nodes(&nodes).is_err());

    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_backend_empty_file_reads_as_empty() {
    let (dir, backend) = setup();
    fs::write(dir.path().join("nodes.json"), "   \n").unwrap();
    assert!(backend.load_nodes().unwrap().is_empty());
}

#[test]
fn test_fs_backend_write_lock_is_exclusive() {
    let (dir, backend) = setup();
    let held = backend.write_lock().unwrap().unwrap();
    assert!(held.is_held());
    assert!(StoreLock::acquire(dir.path()).is_err());
    drop(held);
    assert!(StoreLock::acquire(dir.path()).is_ok());
}

#[test]
fn test_fs_backend_location_is_data_dir() {
    let (dir, backend) = setup();
    assert_eq!(backend.location(), dir.path().display().to_string());
    assert_eq!(backend.root(), dir.path());
}
