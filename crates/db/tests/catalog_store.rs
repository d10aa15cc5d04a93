//! Integration tests for the JSON catalog file and the single-writer store.
//!
//! Each test works in its own temp directory.

use std::sync::Arc;

use assert_matches::assert_matches;
use mograph_db::models::preset::{NewPreset, PresetChanges};
use mograph_db::{CatalogFile, CatalogStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_preset(title: &str) -> NewPreset {
    NewPreset {
        title: title.to_string(),
        subtitle: "s".to_string(),
        kategori: "Animation".to_string(),
        size: "500 KB".to_string(),
        format: "PNG".to_string(),
        preset_type: "xml".to_string(),
        author_url: "https://tiktok.com/@a".to_string(),
        img_url: "/image/preset-1.png".to_string(),
        file_url: "/file/preset-1.xml".to_string(),
    }
}

async fn open_store(dir: &tempfile::TempDir) -> (CatalogStore, CatalogFile) {
    let file = CatalogFile::new(dir.path().join("data").join("preset.json"));
    let store = CatalogStore::open(file.clone()).await.unwrap();
    (store, file)
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_initializes_missing_file_as_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let (store, file) = open_store(&dir).await;

    let raw = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(raw.trim(), "[]");
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn open_keeps_existing_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preset.json");
    std::fs::write(&path, r#"[{"id": 7, "title": "Kept"}]"#).unwrap();

    let store = CatalogStore::open(CatalogFile::new(&path)).await.unwrap();
    let presets = store.list().await.unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].title, "Kept");
}

#[tokio::test]
async fn list_reports_corrupt_document() {
    let dir = tempfile::tempdir().unwrap();
    let (store, file) = open_store(&dir).await;
    std::fs::write(file.path(), "{ not json").unwrap();

    assert_matches!(store.list().await, Err(StoreError::Parse { .. }));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_max_plus_one() {
    let dir = tempfile::tempdir().unwrap();
    let (store, file) = open_store(&dir).await;

    let first = store.create(new_preset("A")).await.unwrap();
    assert_eq!(first.id, 1);

    // A hand-edited gap: ids follow the maximum, not the length.
    std::fs::write(file.path(), r#"[{"id": 1}, {"id": 41}]"#).unwrap();
    let next = store.create(new_preset("B")).await.unwrap();
    assert_eq!(next.id, 42);
}

#[tokio::test]
async fn create_round_trips_through_list() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;

    let created = store.create(new_preset("Logo A")).await.unwrap();
    let listed = store.list().await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn duplicate_titles_are_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;

    store.create(new_preset("Same")).await.unwrap();
    store.create(new_preset("Same")).await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;
    let store = Arc::new(store);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(new_preset(&format!("P{i}"))).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    assert_eq!(store.list().await.unwrap().len(), 20);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_is_partial() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;
    let original = store.create(new_preset("Logo A")).await.unwrap();

    let updated = store
        .update(
            original.id,
            PresetChanges {
                kategori: Some("JJ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("preset exists");

    assert_eq!(updated.kategori, "JJ");
    assert_eq!(updated.title, original.title);
    assert_eq!(updated.img_url, original.img_url);
    assert_eq!(updated.file_url, original.file_url);

    let stored = store.find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_missing_id_returns_none_and_leaves_file() {
    let dir = tempfile::tempdir().unwrap();
    let (store, file) = open_store(&dir).await;
    store.create(new_preset("A")).await.unwrap();
    let before = std::fs::read(file.path()).unwrap();

    let result = store.update(99, PresetChanges::default()).await.unwrap();
    assert!(result.is_none());
    assert_eq!(std::fs::read(file.path()).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_returns_removed_record_once() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;
    let created = store.create(new_preset("A")).await.unwrap();

    let removed = store.delete(created.id).await.unwrap();
    assert_eq!(removed, Some(created.clone()));
    assert!(store.list().await.unwrap().is_empty());

    assert_eq!(store.delete(created.id).await.unwrap(), None);
}

#[tokio::test]
async fn delete_on_empty_catalog_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;
    assert_eq!(store.delete(999).await.unwrap(), None);
}

#[tokio::test]
async fn ids_are_not_reused_below_the_maximum() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _file) = open_store(&dir).await;
    store.create(new_preset("A")).await.unwrap();
    let b = store.create(new_preset("B")).await.unwrap();
    store.delete(1).await.unwrap();

    let c = store.create(new_preset("C")).await.unwrap();
    assert_eq!(c.id, b.id + 1);
}

// ---------------------------------------------------------------------------
// Atomic save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_leaves_no_temp_file_and_pretty_prints() {
    let dir = tempfile::tempdir().unwrap();
    let (store, file) = open_store(&dir).await;
    store.create(new_preset("A")).await.unwrap();

    let data_dir = file.path().parent().unwrap();
    let names: Vec<_> = std::fs::read_dir(data_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["preset.json".to_string()]);

    let raw = std::fs::read_to_string(file.path()).unwrap();
    assert!(raw.contains("\n  {"), "catalog should be indented: {raw}");
    assert!(raw.contains("\"type\": \"xml\""));
}
