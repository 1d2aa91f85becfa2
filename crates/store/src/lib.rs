//! Embedded message store for Lynx
//!
//! This crate persists exported chat messages:
//! - Message: The message record, with native-timestamp date fields
//! - Database / MessageStore: Batch insert, lookup, flush and statistics
//! - StoreConfig: `lynx.toml` settings and data directory resolution
//! - TableSnapshot: CRC-protected snapshot file format

#![warn(clippy::all)]

pub mod config;
pub mod message;
pub mod snapshot;
pub mod store;

pub use config::{StoreConfig, CONFIG_FILE_NAME, DBPATH_ENV};
pub use message::Message;
pub use snapshot::TableSnapshot;
pub use store::{Database, MessageStats, MessageStore};
