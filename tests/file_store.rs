//! File Store Durability Tests
//!
//! The snapshot-backed store as seen through the catalog:
//! - Every acknowledged mutation survives a reopen
//! - A failed snapshot write leaves the catalog as it was
//! - A tampered or truncated snapshot refuses to open

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use walkdb::catalog::{ErrorKind, WalkCatalog};
use walkdb::store::{FileStore, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

async fn open_catalog(tmp: &TempDir) -> WalkCatalog {
    let store = FileStore::open(tmp.path().join("walks.snapshot")).await.unwrap();
    WalkCatalog::with_store(Arc::new(store))
}

// =============================================================================
// Reopen Tests
// =============================================================================

/// Creates, updates, keyword appends and deletes all persist.
#[tokio::test]
async fn test_mutations_survive_reopen() {
    let tmp = TempDir::new().unwrap();

    let (kept, removed) = {
        let catalog = open_catalog(&tmp).await;
        let kept = catalog
            .create(json!({
                "name": "Canal Saint-Martin",
                "address": "Quai de Valmy",
                "category": "Promenade",
                "publication_date": "2019-05-12"
            }))
            .await
            .unwrap();
        let removed = catalog
            .create(json!({"name": "Temp", "address": "x", "category": "y"}))
            .await
            .unwrap();

        let id = kept.id.to_string();
        catalog
            .update_by_id(&id, json!({"postal_code": 75010}))
            .await
            .unwrap();
        catalog
            .add_keyword(&id, json!({"keyword": "écluse"}))
            .await
            .unwrap();
        catalog.delete_by_id(&removed.id.to_string()).await.unwrap();
        (kept, removed)
    };

    let catalog = open_catalog(&tmp).await;
    let all = catalog.get_all().await.unwrap();
    assert_eq!(all.len(), 1);

    let walk = &all[0];
    assert_eq!(walk.id, kept.id);
    assert_eq!(walk.postal_code.as_deref(), Some("75010"));
    assert_eq!(walk.keywords, vec!["écluse"]);
    assert_eq!(walk.publication_date, kept.publication_date);

    let err = catalog
        .get_by_id(&removed.id.to_string())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// Rejected requests leave the snapshot untouched.
#[tokio::test]
async fn test_rejected_mutation_does_not_write() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("walks.snapshot");

    let catalog = open_catalog(&tmp).await;
    catalog
        .create(json!({"name": "A", "address": "B", "category": "C"}))
        .await
        .unwrap();
    let before = fs::read(&path).unwrap();

    assert!(catalog.create(json!({"name": "A"})).await.is_err());
    assert!(catalog.district_count("x").await.is_err());

    assert_eq!(fs::read(&path).unwrap(), before);
}

/// A write that cannot reach disk is reported and rolled back, so the
/// same request succeeds once the directory is back.
#[tokio::test]
async fn test_failed_write_rolls_back() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("data");
    fs::create_dir(&dir).unwrap();

    let store = FileStore::open(dir.join("walks.snapshot")).await.unwrap();
    let catalog = WalkCatalog::with_store(Arc::new(store));
    let walk = catalog
        .create(json!({"name": "Louvre", "address": "Rivoli", "category": "Musée"}))
        .await
        .unwrap();
    let id = walk.id.to_string();

    fs::remove_dir_all(&dir).unwrap();

    let err = catalog
        .add_keyword(&id, json!({"keyword": "art"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceError);
    let err = catalog
        .create(json!({"name": "Orsay", "address": "Quai", "category": "Musée"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceError);

    assert_eq!(catalog.get_by_id(&id).await.unwrap().keywords, Vec::<String>::new());
    assert_eq!(catalog.get_all().await.unwrap().len(), 1);

    fs::create_dir(&dir).unwrap();
    let walk = catalog
        .add_keyword(&id, json!({"keyword": "art"}))
        .await
        .unwrap();
    assert_eq!(walk.keywords, vec!["art"]);
}

// =============================================================================
// Corruption Tests
// =============================================================================

/// Flipping a byte in the body fails the checksum.
#[tokio::test]
async fn test_tampered_snapshot_is_corrupted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("walks.snapshot");

    {
        let catalog = open_catalog(&tmp).await;
        catalog
            .create(json!({"name": "Louvre", "address": "Rivoli", "category": "Musée"}))
            .await
            .unwrap();
    }

    let mut bytes = fs::read(&path).unwrap();
    let pos = bytes
        .windows(6)
        .position(|w| w == b"Louvre")
        .unwrap();
    bytes[pos] = b'M';
    fs::write(&path, &bytes).unwrap();

    let err = FileStore::open(&path).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupted(_)), "{err:?}");
}

/// A snapshot cut short is rejected.
#[tokio::test]
async fn test_truncated_snapshot_is_corrupted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("walks.snapshot");

    {
        let catalog = open_catalog(&tmp).await;
        catalog
            .create(json!({"name": "Louvre", "address": "Rivoli", "category": "Musée"}))
            .await
            .unwrap();
    }

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

    let err = FileStore::open(&path).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupted(_)), "{err:?}");
}
