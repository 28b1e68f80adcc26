//! Integration tests for the on-disk archive layout.
//!
//! Exercises records, naming, metadata persistence and existence checks
//! together the way the download pipeline uses them.

use std::fs;

use civarc_core::{
    MetadataLayout, MetadataStore, ModelRecord, PersistOutcome, exists, file_target_path,
    image_target_stem, model_dir, version_dir,
};
use serde_json::json;
use tempfile::tempdir;

fn record() -> ModelRecord {
    ModelRecord::from_value(json!({
        "id": 11,
        "nsfw": false,
        "modelVersions": [{
            "id": 22,
            "createdAt": "2024-05-01T00:00:00.000Z",
            "files": [{
                "name": "weights.safetensors",
                "downloadUrl": "https://civitai.com/api/download/models/22",
                "hashes": {"SHA256": "DEADBEEF"}
            }],
            "images": [{"url": "https://image.civitai.com/x/width=450/1.jpeg", "hash": "abcd", "width": 512}]
        }]
    }))
    .unwrap()
}

#[test]
fn test_metadata_round_trips_through_store() {
    let temp = tempdir().unwrap();
    let model = record();
    let store = MetadataStore::new(temp.path(), MetadataLayout::ModelDirectories);

    fs::create_dir_all(model_dir(temp.path(), model.id)).unwrap();
    assert_eq!(
        store.persist(model.id, model.raw(), false).unwrap(),
        PersistOutcome::Written
    );

    let reloaded = ModelRecord::from_value(store.read(model.id).unwrap()).unwrap();
    assert_eq!(reloaded, model);
}

#[test]
fn test_resolved_paths_gate_existing_assets() {
    let temp = tempdir().unwrap();
    let model = record();
    let version = model.latest().unwrap();
    let dir = version_dir(temp.path(), model.id, version.id);
    fs::create_dir_all(&dir).unwrap();

    let file_path = file_target_path(temp.path(), model.id, version.id, &version.files[0]);
    assert_eq!(file_path, dir.join("deadbeef.safetensors"));

    let stem = image_target_stem(&version.images[0]);
    assert!(!exists(&dir, &stem, true));

    fs::write(&file_path, b"weights").unwrap();
    fs::write(dir.join(format!("{stem}.jpg")), b"jpeg").unwrap();

    assert!(exists(&dir, "deadbeef.safetensors", false));
    assert!(exists(&dir, &stem, true));
}

#[test]
fn test_replay_after_persist_lists_every_model() {
    let temp = tempdir().unwrap();
    let store = MetadataStore::new(temp.path(), MetadataLayout::ModelDirectories);
    let model = record();
    fs::create_dir_all(model_dir(temp.path(), model.id)).unwrap();
    store.persist(model.id, model.raw(), false).unwrap();

    let page = store.load_all();
    assert_eq!(page.items.len(), 1);
    assert_eq!(ModelRecord::from_value(page.items[0].clone()).unwrap().id, 11);
}
