use crate::common::*;
use lynx::{Database, Error, Message, MessageStore, StoreConfig, TableSnapshot};
use tempfile::TempDir;

#[test]
fn open_creates_default_config() {
    let dir = TempDir::new().unwrap();
    let store = MessageStore::open(dir.path()).unwrap();
    assert!(dir.path().join(lynx_store::CONFIG_FILE_NAME).exists());
    assert_eq!(store.config(), &StoreConfig::default());
    assert!(store.is_empty());
}

#[test]
fn flush_then_reopen_restores_messages() {
    let dir = TempDir::new().unwrap();
    let originals: Vec<Message> = (0..10).map(test_message).collect();

    let ids = {
        let store = MessageStore::open(dir.path()).unwrap();
        store.setup_db().unwrap();
        let ids = store.insert_batch(originals.clone()).unwrap();
        store.flush().unwrap();
        ids
    };

    let store = MessageStore::open(dir.path()).unwrap();
    assert_eq!(store.len(), 10);
    for (id, original) in ids.iter().zip(&originals) {
        let restored = store.get(*id).unwrap();
        assert_eq!(restored.id, Some(*id));
        assert_eq!(
            Message {
                id: None,
                ..restored
            },
            *original
        );
    }
}

#[test]
fn ids_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = MessageStore::open(dir.path()).unwrap();
        store.insert_batch(vec![test_message(0), test_message(1)]).unwrap();
        store.flush().unwrap();
    }
    let store = MessageStore::open(dir.path()).unwrap();
    let ids = store.insert_batch(vec![test_message(2)]).unwrap();
    assert_eq!(ids, vec![3]);
}

#[test]
fn unflushed_inserts_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    {
        let store = MessageStore::open(dir.path()).unwrap();
        store.insert_batch(vec![test_message(0)]).unwrap();
    }
    let store = MessageStore::open(dir.path()).unwrap();
    assert!(store.is_empty());
}

#[test]
fn corrupted_snapshot_is_reported() {
    let dir = TempDir::new().unwrap();
    {
        let store = MessageStore::open(dir.path()).unwrap();
        store.insert_batch(vec![test_message(0)]).unwrap();
        store.flush().unwrap();
    }

    let path = TableSnapshot::path(dir.path(), "messages");
    let mut bytes = std::fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    match MessageStore::open(dir.path()) {
        Err(Error::Corruption(_)) => {}
        Err(other) => panic!("expected corruption, got {other}"),
        Ok(_) => panic!("expected corruption, store opened"),
    }
}

#[test]
fn custom_table_name_names_the_snapshot() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(lynx_store::CONFIG_FILE_NAME),
        "messages_table = \"archive\"\nsync_on_flush = false\n",
    )
    .unwrap();

    let store = MessageStore::open(dir.path()).unwrap();
    store.insert_batch(vec![test_message(0)]).unwrap();
    store.flush().unwrap();

    assert!(TableSnapshot::path(dir.path(), "archive").exists());
    assert!(!TableSnapshot::path(dir.path(), "messages").exists());
}

#[test]
fn stats_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let before = {
        let store = MessageStore::open(dir.path()).unwrap();
        store.insert_batch((0..8).map(test_message).collect()).unwrap();
        store.flush().unwrap();
        store.stats().unwrap()
    };
    let after = MessageStore::open(dir.path()).unwrap().stats().unwrap();
    assert_eq!(before, after);
    assert_eq!(after.message_count, 8);
    assert_eq!(after.thread_count, 4);
    assert_eq!(after.person_count, 8);
    assert_eq!(after.sent_count, 4);
    assert_eq!(after.first_date, Some(new_year()));
}
