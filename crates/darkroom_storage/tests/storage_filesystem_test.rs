//! Tests for filesystem storage backend.

use darkroom_storage::{FileSystemStorage, MediaStorage};
use darkroom_error::{DarkroomErrorKind, StorageErrorKind};
use tempfile::TempDir;

fn storage_kind(err: &darkroom_error::DarkroomError) -> Option<&StorageErrorKind> {
    match err.kind() {
        DarkroomErrorKind::Storage(e) => Some(&e.kind),
        _ => None,
    }
}

#[tokio::test]
async fn test_put_and_get() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let data = b"Hello, world!";
    let size = storage.put("original/ab/cd/photo.jpg", data).await.unwrap();
    assert_eq!(size, data.len() as u64);

    let retrieved = storage.get("original/ab/cd/photo.jpg").await.unwrap();
    assert_eq!(retrieved, data);
    assert!(temp_dir.path().join("original/ab/cd/photo.jpg").exists());
    assert!(!temp_dir.path().join("original/ab/cd/photo.tmp").exists());
}

#[tokio::test]
async fn test_put_replaces_content() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    storage.put("thumb/a.jpg", b"first").await.unwrap();
    storage.put("thumb/a.jpg", b"second").await.unwrap();
    assert_eq!(storage.get("thumb/a.jpg").await.unwrap(), b"second");
}

#[tokio::test]
async fn test_delete() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    storage.put("small/x.jpg", b"To be deleted").await.unwrap();
    assert!(storage.exists("small/x.jpg").await.unwrap());

    storage.delete("small/x.jpg").await.unwrap();
    assert!(!storage.exists("small/x.jpg").await.unwrap());

    let err = storage.get("small/x.jpg").await.unwrap_err();
    assert!(matches!(storage_kind(&err), Some(StorageErrorKind::Missing(_))));
}

#[tokio::test]
async fn test_relocate() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    storage.put("original/11/22/video.mov", b"moov").await.unwrap();
    storage
        .relocate("original/11/22/video.mov", "original/33/44/still.mov")
        .await
        .unwrap();

    assert!(!storage.exists("original/11/22/video.mov").await.unwrap());
    assert_eq!(
        storage.get("original/33/44/still.mov").await.unwrap(),
        b"moov"
    );
}

#[tokio::test]
async fn test_relocate_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    storage.put("a.mov", b"a").await.unwrap();
    storage.put("b.mov", b"b").await.unwrap();

    let err = storage.relocate("a.mov", "b.mov").await.unwrap_err();
    assert!(matches!(
        storage_kind(&err),
        Some(StorageErrorKind::Occupied(_))
    ));
    assert_eq!(storage.get("a.mov").await.unwrap(), b"a");
}

#[tokio::test]
async fn test_rejects_keys_outside_base() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    for key in ["", "../escape.jpg", "/etc/passwd", "thumb/../../x.jpg"] {
        let err = storage.put(key, b"x").await.unwrap_err();
        assert!(
            matches!(storage_kind(&err), Some(StorageErrorKind::InvalidKey(_))),
            "key {:?} was accepted",
            key
        );
    }
}
