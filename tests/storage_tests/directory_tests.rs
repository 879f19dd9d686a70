//! Tests for NamespaceDirectory
//!
//! These tests verify:
//! - Namespace creation, id uniqueness and name uniqueness
//! - Lookup with stats overlay
//! - Paged listing ordered by creation time
//! - Rename and delete semantics

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::thread;

use nskv::storage::{Layout, NamespaceDirectory};
use nskv::KvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_directory() -> (TempDir, NamespaceDirectory) {
    let temp_dir = TempDir::new().unwrap();
    let directory = NamespaceDirectory::open(Layout::new(temp_dir.path()), "default").unwrap();
    (temp_dir, directory)
}

fn create_many(directory: &NamespaceDirectory, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| directory.create(&format!("ns-{:02}", i), "actor", "run").unwrap())
        .collect()
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_open_creates_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("kv");

    let _directory = NamespaceDirectory::open(Layout::new(&root), "default").unwrap();

    assert!(root.is_dir());
}

#[test]
fn test_create_writes_metadata() {
    let (temp, directory) = setup_temp_directory();

    let id = directory.create("products", "actor-7", "run-9").unwrap();

    assert!(directory.exists(&id));
    assert!(temp.path().join(&id).join("metadata").is_file());

    let record = directory.read_record(&id).unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.name, "products");
    assert_eq!(record.actor_id, "actor-7");
    assert_eq!(record.run_id, "run-9");
    assert_eq!(record.created_at, record.updated_at);
}

#[test]
fn test_create_ids_are_unique() {
    let (_temp, directory) = setup_temp_directory();

    let ids = create_many(&directory, 20);

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_create_duplicate_name_fails() {
    let (_temp, directory) = setup_temp_directory();

    directory.create("shared", "a", "r").unwrap();
    let result = directory.create("shared", "b", "r");

    assert!(matches!(result, Err(KvError::AlreadyExists(ref name)) if name == "shared"));
}

#[test]
fn test_create_name_match_is_case_sensitive() {
    let (_temp, directory) = setup_temp_directory();

    directory.create("Shared", "a", "r").unwrap();

    assert!(directory.create("shared", "a", "r").is_ok());
}

#[test]
fn test_create_empty_name_rejected() {
    let (_temp, directory) = setup_temp_directory();

    assert!(matches!(
        directory.create("", "a", "r"),
        Err(KvError::InvalidArgument(_))
    ));
}

#[test]
fn test_create_name_free_after_delete() {
    let (_temp, directory) = setup_temp_directory();

    let id = directory.create("reused", "a", "r").unwrap();
    directory.delete(&id).unwrap();

    assert!(directory.create("reused", "a", "r").is_ok());
}

#[test]
fn test_concurrent_creates_same_name_one_wins() {
    let (_temp, directory) = setup_temp_directory();
    let directory = Arc::new(directory);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let directory = Arc::clone(&directory);
            thread::spawn(move || directory.create("contended", "a", "r"))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(KvError::AlreadyExists(_))))
        .count();
    assert_eq!(created, 1);
    assert_eq!(rejected, 7);
}

// =============================================================================
// Get Tests
// =============================================================================

#[test]
fn test_get_missing_namespace() {
    let (_temp, directory) = setup_temp_directory();

    let result = directory.get("not-there");

    assert!(matches!(result, Err(KvError::NamespaceNotFound(_))));
}

#[test]
fn test_get_fresh_namespace_has_empty_stats() {
    let (_temp, directory) = setup_temp_directory();
    let id = directory.create("empty", "a", "r").unwrap();

    let info = directory.get(&id).unwrap();

    assert_eq!(info.stats.count, 0);
    assert_eq!(info.stats.size, 0);
}

#[test]
fn test_get_bad_metadata_is_malformed() {
    let (temp, directory) = setup_temp_directory();
    let id = directory.create("broken", "a", "r").unwrap();

    fs::write(temp.path().join(&id).join("metadata"), b"garbage").unwrap();

    assert!(matches!(
        directory.get(&id),
        Err(KvError::MalformedRecord { .. })
    ));
}

// =============================================================================
// List Tests
// =============================================================================

#[test]
fn test_list_pagination_boundaries() {
    let (_temp, directory) = setup_temp_directory();
    create_many(&directory, 10);

    let page4 = directory.list(4, 3, false).unwrap();
    assert_eq!(page4.items.len(), 1);
    assert_eq!(page4.total, 10);
    assert_eq!(page4.total_pages, 4);

    let page5 = directory.list(5, 3, false).unwrap();
    assert!(page5.items.is_empty());
    assert_eq!(page5.total, 10);
    assert_eq!(page5.total_pages, 4);
}

#[test]
fn test_list_orders_by_creation_time() {
    let (_temp, directory) = setup_temp_directory();
    let ids = create_many(&directory, 5);

    let asc = directory.list(1, 10, false).unwrap();
    let desc = directory.list(1, 10, true).unwrap();

    let asc_times: Vec<_> = asc.items.iter().map(|n| n.created_at).collect();
    let desc_times: Vec<_> = desc.items.iter().map(|n| n.created_at).collect();

    assert!(asc_times.windows(2).all(|w| w[0] <= w[1]));
    assert!(desc_times.windows(2).all(|w| w[0] >= w[1]));

    let listed: HashSet<_> = asc.items.iter().map(|n| n.id.clone()).collect();
    assert_eq!(listed, ids.into_iter().collect());
}

#[test]
fn test_list_skips_namespaces_without_valid_metadata() {
    let (temp, directory) = setup_temp_directory();
    create_many(&directory, 3);

    fs::create_dir(temp.path().join("orphan")).unwrap();
    fs::create_dir(temp.path().join("corrupt")).unwrap();
    fs::write(temp.path().join("corrupt").join("metadata"), b"{]").unwrap();
    fs::write(temp.path().join("stray-file"), b"x").unwrap();

    let page = directory.list(1, 10, false).unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);
}

#[test]
fn test_list_empty_root() {
    let (_temp, directory) = setup_temp_directory();

    let page = directory.list(1, 10, true).unwrap();

    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.items.is_empty());
}

#[test]
fn test_list_zero_page_size_rejected() {
    let (_temp, directory) = setup_temp_directory();

    assert!(matches!(
        directory.list(1, 0, false),
        Err(KvError::InvalidArgument(_))
    ));
}

// =============================================================================
// Rename Tests
// =============================================================================

#[test]
fn test_rename_keeps_id() {
    let (_temp, directory) = setup_temp_directory();
    let id = directory.create("before", "a", "r").unwrap();
    let created = directory.read_record(&id).unwrap();

    assert!(directory.rename(&id, "after").unwrap());

    let renamed = directory.read_record(&id).unwrap();
    assert_eq!(renamed.id, id);
    assert_eq!(renamed.name, "after");
    assert_eq!(renamed.created_at, created.created_at);
    assert!(renamed.updated_at >= created.updated_at);
}

#[test]
fn test_rename_missing_namespace() {
    let (_temp, directory) = setup_temp_directory();

    assert!(matches!(
        directory.rename("ghost", "x"),
        Err(KvError::NamespaceNotFound(_))
    ));
}

#[test]
fn test_rename_does_not_enforce_uniqueness() {
    let (_temp, directory) = setup_temp_directory();
    directory.create("taken", "a", "r").unwrap();
    let other = directory.create("other", "a", "r").unwrap();

    assert!(directory.rename(&other, "taken").unwrap());

    let names: Vec<_> = directory
        .list(1, 10, false)
        .unwrap()
        .items
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names.iter().filter(|n| *n == "taken").count(), 2);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_everything() {
    let (temp, directory) = setup_temp_directory();
    let id = directory.create("doomed", "a", "r").unwrap();
    fs::write(temp.path().join(&id).join("some-key"), b"{}").unwrap();

    assert!(directory.delete(&id).unwrap());

    assert!(!temp.path().join(&id).exists());
    assert!(!directory.exists(&id));
    assert!(matches!(
        directory.get(&id),
        Err(KvError::NamespaceNotFound(_))
    ));
}

#[test]
fn test_delete_missing_namespace_succeeds() {
    let (_temp, directory) = setup_temp_directory();

    assert!(directory.delete("never-existed").unwrap());
}

#[test]
fn test_delete_rejects_path_escape() {
    let (_temp, directory) = setup_temp_directory();

    assert!(matches!(
        directory.delete(".."),
        Err(KvError::InvalidArgument(_))
    ));
    assert!(!directory.exists(".."));
}
