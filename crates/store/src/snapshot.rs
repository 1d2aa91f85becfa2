//! Table snapshot files.
//!
//! `flush` writes the whole messages table to `<table>.snap` in the data
//! directory; `open` reads it back.
//!
//! # Binary Format
//!
//! ```text
//! magic("LYNX", 4) + version(4) + payload_len(8) + payload + crc32(4)
//! ```
//!
//! All integers are little-endian. The payload is the MessagePack encoding of
//! [`TableSnapshot`]. The CRC covers every byte before it.

use lynx_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Magic bytes for snapshot files.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"LYNX";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_SIZE: usize = 16;
const CRC_SIZE: usize = 4;

/// Persisted contents of one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Next record id to hand out.
    pub next_id: u64,
    /// Records in native form, keyed by record id.
    pub records: BTreeMap<u64, Value>,
}

impl TableSnapshot {
    /// Path of the snapshot file for `table` inside `dir`.
    pub fn path(dir: &Path, table: &str) -> PathBuf {
        dir.join(format!("{}.snap", table))
    }

    /// Serialize to the full binary format with CRC.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = rmp_serde::to_vec(self)?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        buf.extend_from_slice(SNAPSHOT_MAGIC);
        buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        buf.extend_from_slice(&payload);

        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }

    /// Deserialize from bytes, validating magic, version, length and CRC.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE + CRC_SIZE {
            return Err(Error::Corruption(format!(
                "snapshot too short: {} bytes",
                data.len()
            )));
        }
        if &data[0..4] != SNAPSHOT_MAGIC {
            return Err(Error::Corruption("invalid snapshot magic bytes".to_string()));
        }

        let version = u32::from_le_bytes(read_array(&data[4..8]));
        if version != SNAPSHOT_VERSION {
            return Err(Error::Corruption(format!(
                "unsupported snapshot version: {}",
                version
            )));
        }

        let payload_len = u64::from_le_bytes(read_array(&data[8..16]));
        let expected = (HEADER_SIZE as u64)
            .checked_add(payload_len)
            .and_then(|n| n.checked_add(CRC_SIZE as u64));
        if expected != Some(data.len() as u64) {
            return Err(Error::Corruption(format!(
                "snapshot length mismatch: header says {} payload bytes, file has {}",
                payload_len,
                data.len()
            )));
        }

        let crc_offset = data.len() - CRC_SIZE;
        let stored_crc = u32::from_le_bytes(read_array(&data[crc_offset..]));
        let computed_crc = crc32fast::hash(&data[..crc_offset]);
        if stored_crc != computed_crc {
            return Err(Error::Corruption(format!(
                "snapshot checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, computed_crc
            )));
        }

        Ok(rmp_serde::from_slice(&data[HEADER_SIZE..crc_offset])?)
    }

    /// Write the snapshot using write-fsync-rename.
    ///
    /// With `sync` false the file is renamed into place without fsync.
    pub fn write_to_file(&self, path: &Path, sync: bool) -> Result<()> {
        let temp_path = path.with_extension("snap.tmp");
        let bytes = self.to_bytes()?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(&bytes)?;
        if sync {
            file.sync_all()?;
        }
        drop(file);

        std::fs::rename(&temp_path, path)?;

        if sync {
            if let Some(parent) = path.parent() {
                if parent.exists() {
                    File::open(parent)?.sync_all()?;
                }
            }
        }
        Ok(())
    }

    /// Read a snapshot file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read_from_file(path: &Path) -> Result<Option<Self>> {
        match std::fs::read(path) {
            Ok(data) => Ok(Some(Self::from_bytes(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
