//! Error types for Lynx
//!
//! A single error enum is shared by the codec, the record encoder/decoder and
//! the message store. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! `Error` implements both `serde::ser::Error` and `serde::de::Error`, so it
//! is the error type of the native `Value` serializer and deserializer.
//! Custom serializer errors become `Encoding`, custom deserializer errors
//! become `Decoding`.

use std::fmt::Display;
use std::io;
use thiserror::Error;

/// Result type alias for Lynx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Lynx
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder could not accept a value
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A native value did not match the requested shape
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// I/O error (snapshot and config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Foreign-format serialization error (MessagePack, bincode)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record id not present in the store
    #[error("Record not found: {0}")]
    NotFound(u64),
}

impl Error {
    /// Returns `true` for errors raised while encoding a value.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Error::Encoding(_))
    }

    /// Returns `true` for errors raised while decoding a value.
    pub fn is_decoding(&self) -> bool {
        matches!(self, Error::Decoding(_))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Encoding(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Decoding(msg.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_encoding() {
        let err = Error::Encoding("map key must be a string".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Encoding error"));
        assert!(msg.contains("map key must be a string"));
        assert!(err.is_encoding());
        assert!(!err.is_decoding());
    }

    #[test]
    fn test_error_display_decoding() {
        let err = Error::Decoding("expected native timestamp".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Decoding error"));
        assert!(err.is_decoding());
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound(42);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_ser_custom_is_encoding() {
        let err = <Error as serde::ser::Error>::custom("sink closed");
        assert!(matches!(err, Error::Encoding(ref m) if m == "sink closed"));
    }

    #[test]
    fn test_de_custom_is_decoding() {
        let err = <Error as serde::de::Error>::custom("bad input");
        assert!(matches!(err, Error::Decoding(ref m) if m == "bad input"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_bincode() {
        let invalid_data = vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<String> = bincode::deserialize(&invalid_data).map_err(|e| e.into());
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_error_from_rmp() {
        let result: Result<String> = rmp_serde::from_slice(&[0xC1]).map_err(|e| e.into());
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
