//! Message store integration tests.
//!
//! Persisted records must survive flush and reopen with their datetimes
//! intact and their absent datetimes still absent.

mod common;

mod persistence;
mod timestamp_fields;
