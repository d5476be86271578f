// Data models for the task widget

use crate::codec::{lenient_bool, lenient_i64, lenient_present, lenient_string};
use crate::record::Record;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Prefix for ids of tasks created from the widget surface
pub const WIDGET_ID_PREFIX: &str = "widget_";

/// A single task, tagged with the list (partition) that owns it
///
/// Every field decodes leniently: a missing or mistyped field falls back to its
/// zero value instead of rejecting the record. Fields written by the main
/// application that this crate does not model (e.g. `parentTaskId`) are kept in
/// `extra` and written back unchanged. `createdAt` is kept as stored JSON, since
/// the host writes it as text, epoch millis, or a timestamp object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(rename = "taskListId", deserialize_with = "lenient_string")]
    pub list_id: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub order: i64,
    #[serde(
        rename = "createdAt",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_present"
    )]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Create a fresh, uncompleted task for `list_id` with a new unique id
    pub fn new(list_id: impl Into<String>, text: impl Into<String>, order: i64) -> Self {
        Self {
            id: new_task_id(),
            text: text.into(),
            completed: false,
            list_id: list_id.into(),
            order,
            created_at: Some(Value::String(now_rfc3339())),
            extra: Map::new(),
        }
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn partition(&self) -> &str {
        &self.list_id
    }

    fn collection_name() -> &'static str {
        "tasks"
    }

    fn partition_field() -> &'static str {
        "taskListId"
    }
}

/// A named task list, owned by the main application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskList {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Generate a task id that stays unique under rapid creation
///
/// UUIDv7 keeps ids time-ordered like the host's timestamp ids.
pub fn new_task_id() -> String {
    format!("{}{}", WIDGET_ID_PREFIX, Uuid::now_v7().simple())
}

/// Current time as RFC 3339 with millisecond precision, matching the host's `createdAt`
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
