// Partitioned store over a single serialized collection per record type

use crate::backend::{Backend, FileBackend};
use crate::codec;
use crate::record::Record;
use crate::selection::Selection;
use eyre::{Context, Result, eyre};
use serde_json::value::to_raw_value;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Key holding the dirty bit observed by the host application
pub const DATA_CHANGED_KEY: &str = "widget_data_changed";

/// Result of a partition edit: whether to persist, plus the caller's value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<R> {
    /// Persist the edited partition
    Commit(R),
    /// Leave the medium untouched
    Skip(R),
}

/// Partition-aware store with merge-on-write semantics
///
/// Each record type is persisted as one JSON array under its collection key.
/// Writes replace one whole partition and keep every other partition's records
/// exactly as they were read.
pub struct Store<B: Backend> {
    backend: B,
    write_lock: Mutex<()>,
}

impl Store<FileBackend> {
    /// Open or create a file-backed store at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let backend = FileBackend::open(path)?;
        info!(path = ?backend.base_path(), "Opened store");
        Ok(Self::with_backend(backend))
    }
}

impl<B: Backend> Store<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the underlying storage medium
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load every record of the collection, across all partitions
    pub fn load_all<T: Record>(&self) -> Result<Vec<T>> {
        let text = self.read_collection::<T>()?;
        Ok(codec::decode(&text))
    }

    /// Load the records of the selected partition, in stored order
    ///
    /// No selection yields an empty result, not every record.
    pub fn load_partition<T: Record>(&self, selection: &Selection) -> Result<Vec<T>> {
        if !selection.is_selected() {
            return Ok(Vec::new());
        }
        let records: Vec<T> = self.load_all()?;
        Ok(records.into_iter().filter(|r| selection.matches(r)).collect())
    }

    /// Replace the whole partition `key` with `records`
    ///
    /// Callers pass the complete desired state of the partition; anything not in
    /// `records` is removed from it. Every record must belong to `key`: a record
    /// tagged with another partition is rejected with an error and nothing is
    /// written, so a scoped save can never move records between partitions.
    pub fn replace_partition<T: Record>(&self, key: &str, records: &[T]) -> Result<()> {
        self.modify_partition::<T, _>(key, |current| {
            *current = records.to_vec();
            Edit::Commit(())
        })
    }

    /// Read-modify-write one partition as a single critical section
    ///
    /// `edit` receives the partition's current records. On `Edit::Commit` the
    /// partition is replaced with the edited records, appended after all other
    /// partitions' elements, and the dirty bit is set. Elements of other
    /// partitions are written back as the exact text that was read.
    pub fn modify_partition<T, R>(&self, key: &str, edit: impl FnOnce(&mut Vec<T>) -> Edit<R>) -> Result<R>
    where
        T: Record,
    {
        if key.trim().is_empty() {
            return Err(eyre!("Partition key cannot be empty"));
        }

        let _local = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.backend.lock()?;

        let raw = codec::decode_raw(&self.read_collection::<T>()?);
        let (scoped, mut others): (Vec<_>, Vec<_>) = raw
            .into_iter()
            .partition(|element| codec::string_field(element, T::partition_field()) == key);

        let mut records: Vec<T> = codec::decode_elements(&scoped);

        let result = match edit(&mut records) {
            Edit::Skip(result) => {
                debug!(collection = T::collection_name(), partition = key, "Edit skipped, nothing written");
                return Ok(result);
            }
            Edit::Commit(result) => result,
        };

        if let Some(stray) = records.iter().find(|r| r.partition() != key) {
            return Err(eyre!(
                "Record {} belongs to partition {:?}, not {:?}",
                stray.id(),
                stray.partition(),
                key
            ));
        }

        let kept = others.len();
        for record in &records {
            others.push(to_raw_value(record).context("Failed to serialize record")?);
        }

        self.backend
            .set(T::collection_name(), &codec::encode_raw(&others)?)
            .context("Failed to persist collection")?;
        self.backend
            .set(DATA_CHANGED_KEY, "true")
            .context("Failed to set data-changed flag")?;

        debug!(
            collection = T::collection_name(),
            partition = key,
            kept,
            written = records.len(),
            "Replaced partition"
        );
        Ok(result)
    }

    /// Whether any mutation has been persisted since the host last cleared the flag
    pub fn data_changed(&self) -> Result<bool> {
        Ok(self.backend.get(DATA_CHANGED_KEY)?.as_deref() == Some("true"))
    }

    fn read_collection<T: Record>(&self) -> Result<String> {
        Ok(self
            .backend
            .get(T::collection_name())
            .context("Failed to read collection")?
            .unwrap_or_default())
    }
}
