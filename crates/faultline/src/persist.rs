//! Persistence backends for the error store.
//!
//! The persisted shape mirrors a local key-value string store: one
//! namespace map of string keys to string values, with the full record
//! list serialized to JSON and stored under [`STORAGE_KEY`]. Backends only
//! expose load/save of the whole list; the keying is an implementation
//! detail, and writes are read-modify-write with last-writer-wins across
//! processes.
//!
//! File writes are atomic: temp file + sync + rename, so the store is
//! never observable in a partial state.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::PersistError;
use crate::record::ErrorRecord;

/// Fixed key the serialized record list lives under.
pub const STORAGE_KEY: &str = "faultline.error-log";

/// Storage binding for the error store.
pub trait PersistenceBackend: Send {
    /// Read the full persisted record list. A missing entry is an empty
    /// list, not an error.
    fn load(&self) -> Result<Vec<ErrorRecord>, PersistError>;

    /// Serialize the full record list and write it back.
    fn save(&self, records: &[ErrorRecord]) -> Result<(), PersistError>;
}

impl<B> PersistenceBackend for Arc<B>
where
    B: PersistenceBackend + Send + Sync,
{
    fn load(&self) -> Result<Vec<ErrorRecord>, PersistError> {
        (**self).load()
    }

    fn save(&self, records: &[ErrorRecord]) -> Result<(), PersistError> {
        (**self).save(records)
    }
}

/// In-memory backend holding the same serialized string a real store
/// would. The test fake, and the fallback when no storage path exists.
#[derive(Default)]
pub struct MemoryBackend {
    value: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw serialized value, for asserting the persisted layout.
    pub fn raw(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PersistenceBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<ErrorRecord>, PersistError> {
        let guard = self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_deref() {
            Some(serialized) => Ok(serde_json::from_str(serialized)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[ErrorRecord]) -> Result<(), PersistError> {
        let serialized = serde_json::to_string(records)?;
        let mut guard = self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(serialized);
        Ok(())
    }
}

/// File-backed backend: one JSON map of string keys to string values.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_namespace(&self) -> Result<BTreeMap<String, String>, PersistError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<ErrorRecord>, PersistError> {
        let namespace = self.read_namespace()?;
        match namespace.get(STORAGE_KEY) {
            Some(serialized) => Ok(serde_json::from_str(serialized)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[ErrorRecord]) -> Result<(), PersistError> {
        // A corrupted namespace must not block new state: start fresh and
        // let the write win.
        let mut namespace = match self.read_namespace() {
            Ok(namespace) => namespace,
            Err(err) => {
                warn!("discarding unreadable storage at {}: {err}", self.path.display());
                BTreeMap::new()
            }
        };
        namespace.insert(STORAGE_KEY.to_string(), serde_json::to_string(records)?);
        let content = serde_json::to_string_pretty(&namespace)?;
        atomic_write(&self.path, content.as_bytes())?;
        Ok(())
    }
}

/// Write data to a file atomically using temp file + rename.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;
    Ok(())
}
