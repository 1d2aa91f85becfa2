//! Codec between `chrono` UTC datetimes and the native timestamp
//!
//! The helpers are modules meant to be used with serde's `with` attribute:
//!
//! * [`optional_datetime`]: `Option<DateTime<Utc>>` as an optional native
//!   timestamp. Absence maps to the native null.
//! * [`datetime`]: `DateTime<Utc>` as a required native timestamp.
//!
//! When the record is encoded with [`to_value`](crate::to_value) the field
//! becomes `Value::Timestamp` (or `Value::Null`). Every other serde format
//! sees a plain integer number of microseconds since the Unix epoch, so the
//! same record also round-trips through JSON, MessagePack or bincode.
//!
//! Encoding truncates to whole microseconds toward the earlier instant.
//! Decoding is exact.
//!
//! # Example
//!
//! ```
//! use chrono::{DateTime, TimeZone, Utc};
//! use lynx_core::{from_value, to_value, Value};
//!
//! #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Record {
//!     #[serde(with = "lynx_core::codec::optional_datetime")]
//!     delivered: Option<DateTime<Utc>>,
//! }
//!
//! let record = Record {
//!     delivered: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
//! };
//! let stored = to_value(&record)?;
//! assert!(stored.get("delivered").unwrap().is_timestamp());
//! assert_eq!(from_value::<Record>(stored)?, record);
//!
//! let empty = to_value(&Record { delivered: None })?;
//! assert_eq!(empty.get("delivered"), Some(&Value::Null));
//! # Ok::<(), lynx_core::Error>(())
//! ```

use crate::error::Result;
use crate::ser::Serializer;
use crate::value::Value;
use chrono::{DateTime, Utc};

/// Encode an optional datetime directly into its native value.
///
/// Produces `Value::Timestamp` for a present datetime and `Value::Null`
/// otherwise.
pub fn encode(value: &Option<DateTime<Utc>>) -> Result<Value> {
    optional_datetime::serialize(value, Serializer)
}

/// Decode an optional datetime from its native value.
///
/// # Errors
///
/// Returns [`Error::Decoding`](crate::Error::Decoding) when the value is
/// neither `Value::Null` nor an in-range `Value::Timestamp`.
pub fn decode(value: Value) -> Result<Option<DateTime<Utc>>> {
    optional_datetime::deserialize(value)
}

/// (De)serialize `Option<DateTime<Utc>>` as an optional native timestamp.
pub mod optional_datetime {
    use crate::timestamp::Timestamp;
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize an optional datetime.
    pub fn serialize<S>(
        datetime: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => serializer.serialize_some(&Timestamp::from(*dt)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional datetime.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Timestamp>::deserialize(deserializer)?
            .map(DateTime::<Utc>::try_from)
            .transpose()
            .map_err(de::Error::custom)
    }
}

/// (De)serialize `DateTime<Utc>` as a required native timestamp.
pub mod datetime {
    use crate::timestamp::Timestamp;
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a datetime.
    pub fn serialize<S>(datetime: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Timestamp::from(*datetime).serialize(serializer)
    }

    /// Deserialize a datetime.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ts = Timestamp::deserialize(deserializer)?;
        DateTime::<Utc>::try_from(ts).map_err(de::Error::custom)
    }
}
