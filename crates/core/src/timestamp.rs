//! Native microsecond-precision timestamp type
//!
//! This is the storage engine's own timestamp. Records encoded into the native
//! [`Value`](crate::Value) model carry their instants as `Value::Timestamp`,
//! never as bare integers, so a timestamp slot can always be told apart from
//! an integer slot.
//!
//! ## Precision
//!
//! Timestamps are stored as signed microseconds since Unix epoch
//! (1970-01-01 00:00:00 UTC). Negative values are instants before the epoch.
//! The `i64` range (about ±292,000 years) is wider than `chrono`'s, so every
//! `DateTime<Utc>` converts in; converting out can fail for values `chrono`
//! cannot represent.
//!
//! Conversion from `DateTime<Utc>` truncates toward the earlier instant to a
//! whole microsecond. Sub-microsecond remainders never round up.
//!
//! ## Usage
//!
//! ```
//! use lynx_core::Timestamp;
//!
//! let now = Timestamp::now();
//! let from_secs = Timestamp::from_secs(1000);
//! let parsed: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
//! assert_eq!(parsed.to_string(), "2024-01-01T00:00:00Z");
//! ```

use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Reserved newtype-struct name that marks a native timestamp.
///
/// The native `Value` serializer turns a newtype struct with this name into
/// `Value::Timestamp`, and the native deserializer only satisfies a request
/// for it from `Value::Timestamp`. Every other serde format treats it as a
/// transparent `i64`.
pub const TIMESTAMP_NEWTYPE: &str = "$lynx::private::Timestamp";

const MICROS_PER_SEC: i64 = 1_000_000;
const MICROS_PER_MILLI: i64 = 1_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// Microsecond-precision native timestamp
///
/// ## Invariants
///
/// - Timestamps are always in microseconds
/// - Timestamps are comparable and orderable
/// - The zero timestamp represents Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Earliest representable timestamp
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Latest representable timestamp
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a timestamp for the current moment
    pub fn now() -> Self {
        Timestamp::from(Utc::now())
    }

    /// Create a timestamp from microseconds since epoch
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    /// Create a timestamp from milliseconds since epoch
    ///
    /// Saturates at `MIN`/`MAX`.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis.saturating_mul(MICROS_PER_MILLI))
    }

    /// Create a timestamp from seconds since epoch
    ///
    /// Saturates at `MIN`/`MAX`.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(MICROS_PER_SEC))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get microseconds since Unix epoch
    #[inline]
    pub const fn as_micros(&self) -> i64 {
        self.0
    }

    /// Get milliseconds since Unix epoch (floors)
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0.div_euclid(MICROS_PER_MILLI)
    }

    /// Get seconds since Unix epoch (floors)
    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0.div_euclid(MICROS_PER_SEC)
    }

    /// Convert to a `chrono` UTC datetime.
    ///
    /// Returns `None` when the instant lies outside `chrono`'s range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = self.0.div_euclid(MICROS_PER_SEC);
        let nanos = (self.0.rem_euclid(MICROS_PER_SEC) * NANOS_PER_MICRO) as u32;
        DateTime::from_timestamp(secs, nanos)
    }

    /// Check if this timestamp is before another
    #[inline]
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    /// Check if this timestamp is after another
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            // Outside chrono's calendar; fall back to the raw count.
            None => write!(f, "{}us", self.0),
        }
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Parse an RFC 3339 / ISO 8601 instant. Any offset is accepted and
    /// normalized to UTC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Timestamp::from(dt.with_timezone(&Utc)))
            .map_err(|e| Error::Decoding(format!("invalid timestamp '{}': {}", s, e)))
    }
}

// ============================================================================
// chrono conversions
// ============================================================================

impl From<DateTime<Utc>> for Timestamp {
    /// Truncates to whole microseconds, toward the earlier instant.
    fn from(dt: DateTime<Utc>) -> Self {
        // subsec is non-negative, so this floors for pre-epoch instants too.
        let micros = i64::from(dt.timestamp_subsec_nanos()) / NANOS_PER_MICRO;
        Timestamp(dt.timestamp() * MICROS_PER_SEC + micros)
    }
}

impl TryFrom<Timestamp> for DateTime<Utc> {
    type Error = Error;

    fn try_from(ts: Timestamp) -> Result<Self, Self::Error> {
        ts.to_datetime().ok_or_else(|| {
            Error::Decoding(format!(
                "native timestamp {}us is outside the representable datetime range",
                ts.0
            ))
        })
    }
}

impl From<i64> for Timestamp {
    /// Create from raw microseconds
    fn from(micros: i64) -> Self {
        Timestamp::from_micros(micros)
    }
}

impl From<Timestamp> for i64 {
    /// Extract raw microseconds
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// serde
// ============================================================================

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(TIMESTAMP_NEWTYPE, &self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(TIMESTAMP_NEWTYPE, TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> de::Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a native timestamp (microseconds since the Unix epoch)")
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, de: D) -> Result<Timestamp, D::Error> {
        i64::deserialize(de).map(Timestamp)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Timestamp, E> {
        Ok(Timestamp(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Timestamp, E> {
        i64::try_from(v)
            .map(Timestamp)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }
}

// ============================================================================
// Tests
// ============================================================================
