//! FileStore integration tests
//!
//! Exercise the directory-backed store against a real temporary directory.

use encore_storage::{load_json, save_json, FileStore, KeyValueStore, StorageError};
use tempfile::TempDir;

#[tokio::test]
async fn open_creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("nested").join("data");

    let store = FileStore::open(&dir).await.unwrap();

    assert!(dir.is_dir());
    assert_eq!(store.dir(), dir.as_path());
}

#[tokio::test]
async fn documents_survive_reopen() {
    let temp = TempDir::new().unwrap();

    {
        let store = FileStore::open(temp.path()).await.unwrap();
        store.set("played", r#"["a","b"]"#.to_string()).await.unwrap();
    }

    let reopened = FileStore::open(temp.path()).await.unwrap();
    let loaded: Option<Vec<String>> = load_json(&reopened, "played").await.unwrap();
    assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::open(temp.path()).await.unwrap();

    assert_eq!(store.get("never-written").await.unwrap(), None);
}

#[tokio::test]
async fn overwrite_replaces_document_and_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::open(temp.path()).await.unwrap();

    save_json(&store, "played", &vec![1, 2, 3]).await.unwrap();
    save_json(&store, "played", &vec![4]).await.unwrap();

    let loaded: Option<Vec<u32>> = load_json(&store, "played").await.unwrap();
    assert_eq!(loaded, Some(vec![4]));

    let entries: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["played.json".to_string()]);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::open(temp.path()).await.unwrap();

    store.set("played", "[]".to_string()).await.unwrap();
    store.remove("played").await.unwrap();
    store.remove("played").await.unwrap();

    assert_eq!(store.get("played").await.unwrap(), None);
}

#[tokio::test]
async fn rejects_keys_that_escape_the_directory() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::open(temp.path()).await.unwrap();

    let result = store.set("../outside", "x".to_string()).await;
    match result {
        Err(StorageError::InvalidKey(key)) => assert_eq!(key, "../outside"),
        other => panic!("Expected InvalidKey, got: {:?}", other),
    }
}

#[tokio::test]
async fn malformed_document_is_a_serialization_error() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("played.json"), "{{{").unwrap();
    let store = FileStore::open(temp.path()).await.unwrap();

    let result: encore_storage::Result<Option<Vec<u32>>> = load_json(&store, "played").await;
    assert!(matches!(result, Err(StorageError::Serialization(_))));
}
