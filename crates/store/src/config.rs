//! Store configuration via `lynx.toml`
//!
//! On first setup a default `lynx.toml` is written to the data directory. To
//! change settings, edit the file and reopen the store.
//!
//! The data directory itself is chosen by the `DBPATH` environment variable,
//! falling back to the per-user cache directory. `DBPATH=1` also selects the
//! cache directory.

use lynx_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name placed in the store data directory.
pub const CONFIG_FILE_NAME: &str = "lynx.toml";

/// Environment variable selecting the data directory.
pub const DBPATH_ENV: &str = "DBPATH";

/// `DBPATH` value that asks for the default cache directory.
const DBPATH_DEFAULT: &str = "1";

/// Default namespace.
pub const DEFAULT_NAMESPACE: &str = "lynx";
/// Default database name.
pub const DEFAULT_DATABASE: &str = "lynx";
/// Default table holding exported messages.
pub const DEFAULT_MESSAGES_TABLE: &str = "messages";

/// Store configuration loaded from `lynx.toml`.
///
/// # Example
///
/// ```toml
/// namespace = "lynx"
/// database = "lynx"
/// messages_table = "messages"
/// batch_size = 500
/// sync_on_flush = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Namespace the store belongs to.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Database name within the namespace.
    #[serde(default = "default_database")]
    pub database: String,
    /// Table holding exported messages. Also names the snapshot file.
    #[serde(default = "default_messages_table")]
    pub messages_table: String,
    /// Maximum number of records inserted per write-lock acquisition.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// fsync the snapshot and its directory on flush.
    #[serde(default = "default_sync_on_flush")]
    pub sync_on_flush: bool,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_messages_table() -> String {
    DEFAULT_MESSAGES_TABLE.to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_sync_on_flush() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            database: default_database(),
            messages_table: default_messages_table(),
            batch_size: default_batch_size(),
            sync_on_flush: default_sync_on_flush(),
        }
    }
}

impl StoreConfig {
    /// Check field values that `toml` cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero batch size or an empty table name.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be greater than 0".to_string()));
        }
        if self.messages_table.is_empty() {
            return Err(Error::Config("messages_table must not be empty".to_string()));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Lynx store configuration

namespace = "lynx"
database = "lynx"

# Table holding exported messages (also names the snapshot file)
messages_table = "messages"

# Maximum number of records inserted per write-lock acquisition
batch_size = 500

# fsync the snapshot and its directory on flush (default: true)
sync_on_flush = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Load `lynx.toml` from a data directory, using defaults when absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Resolve the data directory.
///
/// `DBPATH` wins when set to a path. When it is unset, empty or `1`,
/// `<cache dir>/lynx/db` is used. Returns `None` when neither can be determined, in which case the
/// caller should fall back to an ephemeral store.
pub fn resolve_data_dir() -> Option<PathBuf> {
    resolve_data_dir_from(std::env::var_os(DBPATH_ENV).map(PathBuf::from))
}

fn resolve_data_dir_from(dbpath: Option<PathBuf>) -> Option<PathBuf> {
    match dbpath {
        Some(path) if !path.as_os_str().is_empty() && path.as_os_str() != DBPATH_DEFAULT => {
            Some(path)
        }
        _ => dirs::cache_dir().map(|cache| cache.join("lynx").join("db")),
    }
}
