//! Integration tests for content key storage on disk

mod common;

use std::fs;

use ::common::crypto::ContentKey;
use ::common::key_store::{ContentKeyStore, FsKeyStore, KeyStoreError, MoveOutcome};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tempfile::TempDir;

fn fs_store() -> (ContentKeyStore<FsKeyStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let provider = FsKeyStore::open(temp_dir.path().join("keys")).unwrap();
    (ContentKeyStore::new(provider), temp_dir)
}

#[test]
fn test_keys_survive_reopen() {
    let (keys, temp) = fs_store();
    let key = keys.generate("tmp-a").unwrap();
    assert_eq!(keys.move_key("tmp-a", "42").unwrap(), MoveOutcome::Moved);
    drop(keys);

    let reopened = ContentKeyStore::new(FsKeyStore::open(temp.path().join("keys")).unwrap());
    assert_eq!(reopened.get("42").unwrap(), key);
    assert_eq!(reopened.ids().unwrap(), vec!["42".to_string()]);
}

#[test]
fn test_move_leaves_exactly_one_file() {
    let (keys, _temp) = fs_store();
    let key = keys.generate("tmp-a").unwrap();

    assert_eq!(keys.move_key("tmp-a", "42").unwrap(), MoveOutcome::Moved);

    let dir = keys.provider().dir();
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["42.key".to_string()]);
    assert_eq!(keys.get("42").unwrap(), key);
}

#[test]
fn test_many_moves_keep_every_key_intact() {
    let (keys, _temp) = fs_store();
    let mut expected = Vec::new();
    for i in 0..20 {
        let ephemeral = format!("tmp-{}", i);
        let key = keys.generate(&ephemeral).unwrap();
        assert_eq!(
            keys.move_key(&ephemeral, &i.to_string()).unwrap(),
            MoveOutcome::Moved
        );
        expected.push((i.to_string(), key));
    }

    for (id, key) in expected {
        assert_eq!(keys.get(&id).unwrap(), key);
    }
    assert!(keys.ids().unwrap().iter().all(|id| !id.starts_with("tmp-")));
}

#[test]
fn test_corrupt_file_on_disk() {
    let (keys, _temp) = fs_store();
    keys.generate("42").unwrap();
    fs::write(keys.provider().path_for("42"), "definitely not base64!").unwrap();

    assert!(matches!(
        keys.get("42"),
        Err(KeyStoreError::InvalidKeyEncoding(id)) if id == "42"
    ));
}

#[test]
fn test_truncated_file_on_disk() {
    let (keys, _temp) = fs_store();
    keys.generate("42").unwrap();
    fs::write(keys.provider().path_for("42"), "AAAA").unwrap();

    assert!(matches!(
        keys.get("42"),
        Err(KeyStoreError::InvalidKeyLength { len: 3, .. })
    ));
}

#[test]
fn test_hand_written_key_file_is_read() {
    let (keys, _temp) = fs_store();
    fs::write(
        keys.provider().path_for("7"),
        format!("{}\n", STANDARD.encode([3u8; 32])),
    )
    .unwrap();
    assert_eq!(keys.get("7").unwrap(), ContentKey::from([3u8; 32]));
}

#[test]
fn test_failed_source_removal_is_not_an_error() {
    let keys = ContentKeyStore::new(common::StickyProvider::default());
    let key = keys.generate("tmp-a").unwrap();

    let outcome = keys.move_key("tmp-a", "42").unwrap();
    assert!(matches!(outcome, MoveOutcome::SourceRetained { .. }));
    assert_eq!(keys.get("42").unwrap(), key);
    // the duplicate is left behind, never the other way round
    assert_eq!(keys.get("tmp-a").unwrap(), key);

    // a retry sees the same key already in place
    assert!(matches!(
        keys.move_key("tmp-a", "42").unwrap(),
        MoveOutcome::SourceRetained { .. }
    ));
}

#[test]
fn test_failed_write_keeps_source() {
    let provider = common::ReadOnlyProvider::default();
    let seeded = ContentKeyStore::new(provider.inner.clone());
    let key = seeded.generate("tmp-a").unwrap();

    let keys = ContentKeyStore::new(provider);
    assert!(matches!(keys.move_key("tmp-a", "42"), Err(KeyStoreError::Storage(_))));
    assert_eq!(keys.get("tmp-a").unwrap(), key);
    assert!(matches!(keys.get("42"), Err(KeyStoreError::KeyNotFound(_))));
}
