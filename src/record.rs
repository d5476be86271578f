// Partition-aware record trait

use serde::{Serialize, de::DeserializeOwned};

/// Core trait that any record kept in a partitioned collection must implement
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Unique identifier for this record, unique across every partition
    fn id(&self) -> &str;

    /// Partition key this record belongs to (e.g. the owning list id)
    fn partition(&self) -> &str;

    /// Collection name for this record type (e.g., "tasks")
    /// Determines the backend key the whole collection is stored under
    fn collection_name() -> &'static str
    where
        Self: Sized;

    /// Serialized field name holding the partition key
    ///
    /// Used to sort raw records into partitions without decoding them.
    fn partition_field() -> &'static str
    where
        Self: Sized;
}
