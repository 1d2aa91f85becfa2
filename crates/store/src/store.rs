//! Embedded message store.
//!
//! Messages are encoded into the native [`Value`] model on insert and decoded
//! on read, so their datetimes live in the table as native timestamps. The
//! table is held in memory behind a `RwLock`; `flush` persists it to a
//! snapshot in the data directory and `open` reloads it.

use crate::config::{self, StoreConfig, CONFIG_FILE_NAME};
use crate::message::Message;
use crate::snapshot::TableSnapshot;
use chrono::{DateTime, Utc};
use lynx_core::{from_value, to_value, Error, Result, Value};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Storage backend for exported messages.
pub trait Database: Send + Sync {
    /// Make sure the data directory and its config file exist.
    ///
    /// Idempotent. A no-op for ephemeral stores.
    fn setup_db(&self) -> Result<()>;

    /// Insert messages, returning their assigned ids in input order.
    ///
    /// All messages are encoded before any is inserted: if one fails to
    /// encode, the table is left untouched.
    fn insert_batch(&self, messages: Vec<Message>) -> Result<Vec<u64>>;

    /// Fetch one message by id.
    fn get(&self, id: u64) -> Result<Message>;

    /// All messages in id order.
    fn messages(&self) -> Result<Vec<Message>>;

    /// Persist the table. A no-op for ephemeral stores.
    fn flush(&self) -> Result<()>;

    /// Summary counts over the stored messages.
    fn stats(&self) -> Result<MessageStats>;
}

/// Summary counts over a message table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStats {
    /// Total messages.
    pub message_count: usize,
    /// Distinct conversations (`unique_chat_id`).
    pub thread_count: usize,
    /// Distinct counterparts (`phone_number`).
    pub person_count: usize,
    /// Messages sent by the owner of the export.
    pub sent_count: usize,
    /// Messages with a read receipt.
    pub read_count: usize,
    /// Earliest `date` among messages that have one.
    pub first_date: Option<DateTime<Utc>>,
    /// Latest `date` among messages that have one.
    pub last_date: Option<DateTime<Utc>>,
}

impl MessageStats {
    fn from_messages(messages: &[Message]) -> Self {
        let threads: HashSet<&str> = messages
            .iter()
            .map(|m| m.unique_chat_id.as_str())
            .collect();
        let persons: HashSet<&str> = messages
            .iter()
            .map(|m| m.phone_number.as_str())
            .collect();
        let dates = messages.iter().filter_map(|m| m.date);

        MessageStats {
            message_count: messages.len(),
            thread_count: threads.len(),
            person_count: persons.len(),
            sent_count: messages.iter().filter(|m| m.is_from_me).count(),
            read_count: messages.iter().filter(|m| m.was_read()).count(),
            first_date: dates.clone().min(),
            last_date: dates.max(),
        }
    }
}

/// Message store backed by an in-memory table and an optional data directory.
pub struct MessageStore {
    config: StoreConfig,
    data_dir: Option<PathBuf>,
    table: RwLock<TableSnapshot>,
    /// Held for the whole snapshot write; flushes share one temp file.
    flush_lock: Mutex<()>,
}

impl MessageStore {
    /// Create a store that lives only in memory.
    pub fn ephemeral() -> Self {
        Self::ephemeral_with_config(StoreConfig::default())
    }

    /// Create an in-memory store with explicit settings.
    pub fn ephemeral_with_config(config: StoreConfig) -> Self {
        MessageStore {
            config,
            data_dir: None,
            table: RwLock::new(TableSnapshot {
                next_id: 1,
                ..TableSnapshot::default()
            }),
            flush_lock: Mutex::new(()),
        }
    }

    /// Open (or create) a store in `dir`.
    ///
    /// Writes a default `lynx.toml` on first open and reloads the table
    /// snapshot if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] if the snapshot fails validation, or an
    /// I/O or config error if the directory cannot be prepared.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        prepare_dir(&dir)?;
        let config = StoreConfig::load_from_dir(&dir)?;

        let snapshot_path = TableSnapshot::path(&dir, &config.messages_table);
        let table = match TableSnapshot::read_from_file(&snapshot_path)? {
            Some(snapshot) => snapshot,
            None => TableSnapshot {
                next_id: 1,
                ..TableSnapshot::default()
            },
        };

        info!(
            path = %dir.display(),
            namespace = %config.namespace,
            database = %config.database,
            records = table.records.len(),
            "Opened message store"
        );

        Ok(MessageStore {
            config,
            data_dir: Some(dir),
            table: RwLock::new(table),
            flush_lock: Mutex::new(()),
        })
    }

    /// Open the store in the directory named by `DBPATH`, or the per-user
    /// cache directory.
    ///
    /// Falls back to an ephemeral store when no directory can be determined.
    pub fn open_default() -> Result<Self> {
        match config::resolve_data_dir() {
            Some(dir) => Self::open(dir),
            None => {
                warn!("No data directory available; using an ephemeral message store");
                Ok(Self::ephemeral())
            }
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Data directory, if the store is persistent.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.table.read().records.len()
    }

    /// Returns `true` if no messages are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw native value of a stored message.
    pub fn get_value(&self, id: u64) -> Option<Value> {
        self.table.read().records.get(&id).cloned()
    }

    fn snapshot_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| TableSnapshot::path(dir, &self.config.messages_table))
    }
}

fn prepare_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    StoreConfig::write_default_if_missing(&dir.join(CONFIG_FILE_NAME))
}

fn record_id(id: u64) -> Result<Value> {
    i64::try_from(id)
        .map(Value::Int)
        .map_err(|_| Error::Encoding(format!("record id {} does not fit a native Int", id)))
}

impl Database for MessageStore {
    fn setup_db(&self) -> Result<()> {
        match &self.data_dir {
            Some(dir) => prepare_dir(dir),
            None => Ok(()),
        }
    }

    fn insert_batch(&self, messages: Vec<Message>) -> Result<Vec<u64>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        // A failed encode must leave the table untouched.
        let mut encoded = Vec::with_capacity(messages.len());
        for mut message in messages {
            message.id = None;
            match to_value(&message)? {
                Value::Object(fields) => encoded.push(fields),
                other => {
                    return Err(Error::Encoding(format!(
                        "message encoded to {}, expected Object",
                        other.type_name()
                    )))
                }
            }
        }

        // Reserve the batch's id range before inserting anything.
        let ids: Vec<u64> = {
            let mut table = self.table.write();
            let first = table.next_id;
            let end = first
                .checked_add(encoded.len() as u64)
                .ok_or_else(|| Error::Encoding("record id space exhausted".to_string()))?;
            record_id(end - 1)?;
            table.next_id = end;
            (first..end).collect()
        };

        let chunk = self.config.batch_size.max(1);
        let mut pending = ids.iter().copied().zip(encoded).peekable();
        while pending.peek().is_some() {
            let mut table = self.table.write();
            for (id, mut fields) in pending.by_ref().take(chunk) {
                fields.insert("id".to_string(), Value::Int(id as i64));
                table.records.insert(id, Value::Object(fields));
            }
        }

        debug!(
            count = ids.len(),
            table = %self.config.messages_table,
            "Inserted message batch"
        );
        Ok(ids)
    }

    fn get(&self, id: u64) -> Result<Message> {
        let value = self.get_value(id).ok_or(Error::NotFound(id))?;
        from_value(value)
    }

    fn messages(&self) -> Result<Vec<Message>> {
        let values: Vec<Value> = self.table.read().records.values().cloned().collect();
        values.into_iter().map(from_value).collect()
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = self.snapshot_path() else {
            return Ok(());
        };
        let _flushing = self.flush_lock.lock();
        let table = self.table.read();
        table.write_to_file(&path, self.config.sync_on_flush)?;
        info!(
            path = %path.display(),
            records = table.records.len(),
            "Flushed message snapshot"
        );
        Ok(())
    }

    fn stats(&self) -> Result<MessageStats> {
        Ok(MessageStats::from_messages(&self.messages()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn message(i: i32) -> Message {
        let mut m = Message::new(
            i,
            format!("guid-{}", i),
            format!("chat-{}", i % 3),
            format!("+1{:010}", i % 4),
        );
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        m.text = Some(format!("Test message {}", i));
        m.is_from_me = i % 2 == 0;
        m.date = Some(base + chrono::Duration::minutes(i64::from(i)));
        if i % 5 == 0 {
            m.date_read = m.date;
        }
        m
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let store = MessageStore::ephemeral();
        let ids = store.insert_batch((0..3).map(message).collect()).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
        let ids = store.insert_batch(vec![message(3)]).unwrap();
        assert_eq!(ids, vec![4]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn empty_batch_is_noop() {
        let store = MessageStore::ephemeral();
        assert!(store.insert_batch(Vec::new()).unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn get_returns_decoded_message_with_id() {
        let store = MessageStore::ephemeral();
        let ids = store.insert_batch(vec![message(7)]).unwrap();
        let got = store.get(ids[0]).unwrap();
        assert_eq!(got.id, Some(ids[0]));
        assert_eq!(got.guid, "guid-7");
        assert_eq!(got.date, message(7).date);
        assert_eq!(got.date_read, None);
    }

    #[test]
    fn stored_dates_are_native_timestamps() {
        let store = MessageStore::ephemeral();
        let ids = store.insert_batch(vec![message(1)]).unwrap();
        let value = store.get_value(ids[0]).unwrap();
        assert!(value.get("date").unwrap().is_timestamp());
        assert_eq!(value.get("date_edited"), Some(&Value::Null));
        assert_eq!(value.get("id"), Some(&Value::Int(ids[0] as i64)));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = MessageStore::ephemeral();
        assert!(matches!(store.get(99), Err(Error::NotFound(99))));
    }

    #[test]
    fn small_batch_size_still_inserts_everything() {
        let config = StoreConfig {
            batch_size: 2,
            ..StoreConfig::default()
        };
        let store = MessageStore::ephemeral_with_config(config);
        let ids = store.insert_batch((0..5).map(message).collect()).unwrap();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let guids: Vec<String> = store
            .messages()
            .unwrap()
            .into_iter()
            .map(|m| m.guid)
            .collect();
        assert_eq!(guids, (0..5).map(|i| format!("guid-{}", i)).collect::<Vec<_>>());
    }

    #[test]
    fn stats_counts() {
        let store = MessageStore::ephemeral();
        store.insert_batch((0..10).map(message).collect()).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.message_count, 10);
        assert_eq!(stats.thread_count, 3);
        assert_eq!(stats.person_count, 4);
        assert_eq!(stats.sent_count, 5);
        assert_eq!(stats.read_count, 2);
        assert_eq!(stats.first_date, message(0).date);
        assert_eq!(stats.last_date, message(9).date);
    }

    #[test]
    fn stats_of_empty_store() {
        let stats = MessageStore::ephemeral().stats().unwrap();
        assert_eq!(stats, MessageStats::default());
    }

    #[test]
    fn ephemeral_flush_and_setup_are_noops() {
        let store = MessageStore::ephemeral();
        store.setup_db().unwrap();
        store.flush().unwrap();
        assert!(store.data_dir().is_none());
    }

    #[test]
    fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(MessageStore::ephemeral());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .insert_batch((0..25).map(|i| message(t * 100 + i)).collect())
                        .unwrap()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 100);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn batch_past_id_range_inserts_nothing() {
        let store = MessageStore::ephemeral();
        store.table.write().next_id = i64::MAX as u64;

        let err = store.insert_batch(vec![message(1), message(2)]).unwrap_err();
        assert!(err.is_encoding());
        assert!(store.is_empty());
        assert_eq!(store.table.read().next_id, i64::MAX as u64);

        let ids = store.insert_batch(vec![message(3)]).unwrap();
        assert_eq!(ids, vec![i64::MAX as u64]);
        assert_eq!(store.get(ids[0]).unwrap().id, ids.first().copied());
    }

    #[test]
    fn concurrent_flushes_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MessageStore::open(dir.path()).unwrap());
        store.insert_batch((0..200).map(message).collect()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        store.flush().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        drop(store);
        let reopened = MessageStore::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 200);
    }
}
