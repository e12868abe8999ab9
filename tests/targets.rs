// tests/targets.rs

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use lazydag::target::{ArtifactStore, LocalStore, MemoryStore, Target};
use tempfile::TempDir;

#[test]
fn test_memory_target_commits_on_finish() {
    let store = MemoryStore::new();
    let target = Target::new(Arc::new(store.clone()), "/out/a");

    assert!(!target.exists().unwrap());

    let mut writer = target.open_write();
    writer.write_all(b"hello").unwrap();
    assert!(!target.exists().unwrap());
    writer.finish().unwrap();

    assert!(target.exists().unwrap());
    assert_eq!(target.read_to_string().unwrap(), "hello");
}

#[test]
fn test_dropped_writer_leaves_no_artifact() {
    let store = MemoryStore::new();
    let target = Target::new(Arc::new(store.clone()), "/out/a");

    {
        let mut writer = target.open_write();
        writer.write_all(b"partial").unwrap();
    }

    assert!(!target.exists().unwrap());
    assert!(store.paths().is_empty());
}

#[test]
fn test_write_with_discards_on_error() {
    let store = MemoryStore::new();
    let target = Target::new(Arc::new(store.clone()), "/out/a");

    let result = target.write_with(|w| {
        w.write_all(b"partial")?;
        Err(anyhow!("body failed half-way"))
    });

    assert!(result.is_err());
    assert!(!target.exists().unwrap());
}

#[test]
fn test_memory_remove_is_recursive() {
    let store = MemoryStore::new();
    store.add_file("/a/1", "x");
    store.add_file("/a/2", "y");
    store.add_file("/b/1", "z");

    store.remove(Path::new("/a")).unwrap();
    assert_eq!(store.paths(), vec![Path::new("/b/1").to_path_buf()]);

    store.remove(Path::new("")).unwrap();
    assert!(store.paths().is_empty());
}

#[test]
fn test_missing_memory_file_is_an_error() {
    let store = MemoryStore::new();
    assert!(store.open_read(Path::new("/nope")).is_err());
}

#[test]
fn test_local_store_writes_atomically_under_root() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let target = Target::new(Arc::new(store.clone()), "nested/dir/out.txt");

    target
        .write_with(|w| {
            w.write_all(b"done")?;
            Ok(())
        })
        .unwrap();

    let full = dir.path().join("nested/dir/out.txt");
    assert_eq!(std::fs::read_to_string(&full).unwrap(), "done");
    assert!(!dir.path().join("nested/dir/out.txt.lazydag-tmp").exists());
    assert_eq!(target.read_to_string().unwrap(), "done");

    target.remove().unwrap();
    assert!(!full.exists());
    assert!(store.remove(Path::new("nested")).is_ok());
    assert!(!dir.path().join("nested").exists());
}
