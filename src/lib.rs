//! Lynx - embedded message store with a native optional-timestamp codec
//!
//! Records are encoded into the storage engine's native [`Value`] model
//! before they are stored. `chrono` datetimes become native [`Timestamp`]s
//! through the serde `with` modules in [`codec`]:
//!
//! ```
//! use chrono::{DateTime, TimeZone, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Row {
//!     #[serde(with = "lynx::codec::optional_datetime")]
//!     delivered: Option<DateTime<Utc>>,
//! }
//!
//! let row = Row {
//!     delivered: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
//! };
//! let value = lynx::to_value(&row)?;
//! assert!(value.get("delivered").map_or(false, |v| v.is_timestamp()));
//! assert_eq!(lynx::from_value::<Row>(value)?, row);
//! # Ok::<(), lynx::Error>(())
//! ```
//!
//! # Quick Start
//!
//! ```
//! use lynx::{Database, Message, MessageStore};
//!
//! let store = MessageStore::ephemeral();
//! let ids = store.insert_batch(vec![Message::new(1, "guid-1", "chat-1", "+10000000001")])?;
//! assert_eq!(store.get(ids[0])?.guid, "guid-1");
//! store.flush()?;
//! # Ok::<(), lynx::Error>(())
//! ```

pub use lynx_core::{codec, from_value, to_value, Error, Result, Timestamp, Value};
pub use lynx_store::{
    Database, Message, MessageStats, MessageStore, StoreConfig, TableSnapshot,
};
