// # File Field Store
//
// File-based implementation of FieldStore with crash recovery.
//
// ## Purpose
//
// Persists the entry being edited as a JSON document so an editing session
// survives restarts of the editor binary.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good entry
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "fields": {
//     "platform": "youtube",
//     "videoId": "dQw4w9WgXcQ",
//     "youtubeOptions": { "default": { "color": "red" }, "custom": {} }
//   }
// }
// ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Error;
use crate::traits::FieldStore;

/// Entry file format version
const ENTRY_FILE_VERSION: &str = "1.0";

/// File-based field store with crash recovery
///
/// Field values are served from memory; every commit rewrites the entry
/// file atomically before it reports success. A failed commit leaves both
/// the file and the in-memory value unchanged.
///
/// # Example
///
/// ```rust,no_run
/// use vidext_core::store::FileFieldStore;
/// use vidext_core::traits::FieldStore;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileFieldStore::open("/var/lib/vidext/entry.json").await?;
///
///     store.set_value("videoId", Some(json!("dQw4w9WgXcQ"))).await?;
///     assert_eq!(store.get_value("videoId"), Some(json!("dQw4w9WgXcQ")));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileFieldStore {
    path: PathBuf,
    fields: RwLock<BTreeMap<String, Value>>,
    /// Serializes file rewrites
    write_lock: Mutex<()>,
}

/// Serializable entry file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct EntryFileFormat {
    version: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl FileFieldStore {
    /// Open or create a file field store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing entry file
    /// 3. If corruption detected, try to load from backup
    /// 4. If both fail, start with an empty entry
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create entry directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let fields = Self::load_entry_with_recovery(&path).await?;

        Ok(Self {
            path,
            fields: RwLock::new(fields),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the entry file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the entry with automatic recovery
    ///
    /// Only parse failures count as corruption; I/O errors are returned.
    async fn load_entry_with_recovery(path: &Path) -> Result<BTreeMap<String, Value>, Error> {
        let err = match Self::load_entry(path).await {
            Ok(fields) => {
                tracing::debug!("Loaded entry from file: {} fields", fields.len());
                return Ok(fields);
            }
            Err(e @ Error::Json(_)) => e,
            Err(e) => return Err(e),
        };

        tracing::warn!(
            "Entry file appears corrupted: {}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty entry.");
            return Ok(BTreeMap::new());
        }

        match Self::load_entry(&backup_path).await {
            Ok(fields) => {
                tracing::info!("Recovered entry from backup: {} fields", fields.len());

                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!("Failed to restore entry file from backup: {}", restore_err);
                }

                Ok(fields)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {}. Starting with empty entry.",
                    backup_err
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Load the entry from a file
    async fn load_entry(path: &Path) -> Result<BTreeMap<String, Value>, Error> {
        if !path.exists() {
            tracing::debug!("Entry file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).await?;
        let entry: EntryFileFormat = serde_json::from_str(&content)?;

        if entry.version != ENTRY_FILE_VERSION {
            tracing::warn!(
                "Entry file version mismatch: expected {}, got {}. Attempting to load anyway.",
                ENTRY_FILE_VERSION,
                entry.version
            );
        }

        Ok(entry.fields)
    }

    /// Write an entry snapshot to file atomically
    async fn write_entry(&self, fields: BTreeMap<String, Value>) -> Result<(), Error> {
        let entry = EntryFileFormat {
            version: ENTRY_FILE_VERSION.to_string(),
            fields,
        };
        let json = serde_json::to_string_pretty(&entry)?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::field_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await?;
            file.flush().await?;
        }

        // Keep the previous good file as backup
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::field_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Entry written to file: {}", self.path.display());
        Ok(())
    }

    /// Restore the entry file from backup
    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await?;
        tracing::info!("Restored entry file from backup");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Snapshot of the entry with one change applied; memory is untouched
    fn staged(&self, field: &str, value: Option<&Value>) -> BTreeMap<String, Value> {
        let mut snapshot = self
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match value {
            Some(value) => {
                snapshot.insert(field.to_string(), value.clone());
            }
            None => {
                snapshot.remove(field);
            }
        }
        snapshot
    }

    /// Make a persisted change visible to readers
    fn commit(&self, field: &str, value: Option<Value>) {
        let mut guard = self.fields.write().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(value) => {
                guard.insert(field.to_string(), value);
            }
            None => {
                guard.remove(field);
            }
        }
    }
}

#[async_trait]
impl FieldStore for FileFieldStore {
    fn get_value(&self, field: &str) -> Option<Value> {
        let guard = self.fields.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(field).cloned()
    }

    async fn set_value(&self, field: &str, value: Option<Value>) -> Result<(), Error> {
        let _write = self.write_lock.lock().await;

        let snapshot = self.staged(field, value.as_ref());

        if let Err(e) = self.write_entry(snapshot).await {
            tracing::warn!("Failed to persist field {}: {}", field, e);
            return Err(e);
        }

        self.commit(field, value);
        Ok(())
    }
}
