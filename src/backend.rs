// Key-value storage medium: string values under named keys, no queries

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

const LOCK_FILE_NAME: &str = ".lock";

/// A storage medium exposing whole-value reads and writes of string keys
///
/// Each `set` is atomic on its own; anything larger (read-modify-write) must
/// hold the guard returned by `lock`.
pub trait Backend: Send + Sync {
    /// Read a key, `None` when it has never been written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value of a key
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Acquire exclusive access to the medium against other processes
    fn lock(&self) -> Result<BackendLock>;
}

/// Guard for `Backend::lock`; the lock is released when dropped
#[derive(Debug)]
pub struct BackendLock {
    _file: Option<File>,
}

impl BackendLock {
    /// A guard holding nothing, for media that are private to one process
    pub fn in_process() -> Self {
        Self { _file: None }
    }
}

/// Directory-backed medium: one file per key
///
/// Writes go to a temp file that is renamed over the key, so a reader never
/// sees a half-written value. Cross-process exclusion uses an `fs2` lock on
/// `<dir>/.lock`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Open or create a medium rooted at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        Ok(Self { base_path })
    }

    /// Get the directory this medium lives in
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path).with_context(|| format!("Failed to read key {}", key))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp_path = self.base_path.join(format!(".{}.tmp", key));

        let written = File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all() // Ensure data is flushed to disk before the rename
            })
            .and_then(|()| fs::rename(&tmp_path, &path));

        if let Err(e) = written {
            match fs::remove_file(&tmp_path) {
                Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                    warn!(key, error = %cleanup, "Failed to remove temp file");
                }
                _ => {}
            }
            return Err(e).with_context(|| format!("Failed to write key {}", key));
        }
        debug!(key, bytes = value.len(), "Wrote key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove key {}", key)),
        }
    }

    fn lock(&self) -> Result<BackendLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(LOCK_FILE_NAME))
            .context("Failed to open lock file")?;

        file.lock_exclusive().context("Failed to acquire file lock")?;

        // Lock is automatically released when file is dropped
        Ok(BackendLock { _file: Some(file) })
    }
}

/// In-memory medium, for tests and embedding hosts that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.values().remove(key);
        Ok(())
    }

    fn lock(&self) -> Result<BackendLock> {
        Ok(BackendLock::in_process())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}
