//! Core types for Lynx
//!
//! This crate defines the storage engine's native data model and the codec
//! that moves `chrono` datetimes in and out of it:
//! - Timestamp: Native microsecond timestamp
//! - Value: Native record representation
//! - ser / de: serde bridge between Rust records and `Value`
//! - codec: `with` modules for `DateTime<Utc>` and `Option<DateTime<Utc>>`
//! - Error: Error type shared by the workspace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod de;
pub mod error;
pub mod ser;
pub mod timestamp;
pub mod value;

pub use de::from_value;
pub use error::{Error, Result};
pub use ser::to_value;
pub use timestamp::{Timestamp, TIMESTAMP_NEWTYPE};
pub use value::Value;
