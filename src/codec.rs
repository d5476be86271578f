// Lenient JSON array codec for stored collections

use eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use serde_json::value::{RawValue, to_raw_value};
use tracing::{debug, warn};

/// Decode a serialized array into records, never failing the caller
///
/// Text that is not a JSON array yields an empty sequence. Elements that do not
/// decode (e.g. non-objects) are skipped. Missing or mistyped fields are
/// defaulted by the record's own lenient field deserializers.
pub fn decode<T: DeserializeOwned>(text: &str) -> Vec<T> {
    decode_elements(&decode_raw(text))
}

/// Decode raw array elements, skipping the ones that do not fit `T`
pub(crate) fn decode_elements<T: DeserializeOwned>(elements: &[Box<RawValue>]) -> Vec<T> {
    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_str(element.get()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Failed to decode record, skipping");
                None
            }
        })
        .collect()
}

/// Encode records as a JSON array
///
/// Cannot fail for records whose `Serialize` impl is infallible (all models in
/// this crate); the `Result` only surfaces a misbehaving custom record type.
pub fn encode<T: Serialize>(records: &[T]) -> Result<String> {
    let elements = records
        .iter()
        .map(|record| to_raw_value(record).context("Failed to serialize record"))
        .collect::<Result<Vec<_>>>()?;
    encode_raw(&elements)
}

/// Split the outer array into elements, keeping each one as its stored text
pub(crate) fn decode_raw(text: &str) -> Vec<Box<RawValue>> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Box<RawValue>>>(text) {
        Ok(elements) => {
            debug!(count = elements.len(), "Decoded stored array");
            elements
        }
        Err(e) => {
            warn!(error = %e, "Stored value is not a JSON array, treating as empty");
            Vec::new()
        }
    }
}

/// Join elements back into an array; each element is written exactly as held
pub(crate) fn encode_raw(elements: &[Box<RawValue>]) -> Result<String> {
    serde_json::to_string(elements).context("Failed to encode collection")
}

/// Read a string field from one raw element with the same coercion the models use
pub(crate) fn string_field(element: &RawValue, field: &str) -> String {
    serde_json::from_str::<Value>(element.get())
        .ok()
        .and_then(|value| value.get(field).map(coerce_string))
        .unwrap_or_default()
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) if s.eq_ignore_ascii_case("true") => true,
        _ => false,
    }
}

fn coerce_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

// Field deserializers. Each accepts any JSON value and never errors.

pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(coerce_string(&Value::deserialize(deserializer)?))
}

/// Keep whatever JSON the field holds, including an explicit `null`
pub fn lenient_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Ok(Some(Value::deserialize(deserializer)?))
}

pub fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(coerce_bool(&Value::deserialize(deserializer)?))
}

pub fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(coerce_i64(&Value::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaskList};
    use serde_json::json;

    fn task(id: &str, list: &str, text: &str) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            list_id: list.to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn test_decode_well_formed() {
        let text = r#"[{"id":"1","text":"a","completed":true,"taskListId":"L1","order":4}]"#;
        let tasks: Vec<Task> = decode(text);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[0].text, "a");
        assert!(tasks[0].completed);
        assert_eq!(tasks[0].list_id, "L1");
        assert_eq!(tasks[0].order, 4);
    }

    #[test]
    fn test_decode_malformed_outer_is_empty() {
        assert!(decode::<Task>("{not json").is_empty());
        assert!(decode::<Task>(r#"{"id":"1"}"#).is_empty());
        assert!(decode::<Task>("42").is_empty());
        assert!(decode::<Task>("").is_empty());
        assert!(decode::<Task>("   ").is_empty());
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let tasks: Vec<Task> = decode(r#"[{}]"#);
        assert_eq!(tasks, vec![Task::default()]);
        assert_eq!(tasks[0].text, "");
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].order, 0);
    }

    #[test]
    fn test_decode_coerces_mistyped_fields() {
        let text = r#"[{"id":7,"text":null,"completed":"TRUE","taskListId":true,"order":"3"},
                       {"id":"b","completed":1,"order":2.9},
                       {"id":"c","completed":"yes","order":"x","createdAt":null}]"#;
        let tasks: Vec<Task> = decode(text);
        assert_eq!(tasks.len(), 3);

        assert_eq!(tasks[0].id, "7");
        assert_eq!(tasks[0].text, "");
        assert!(tasks[0].completed);
        assert_eq!(tasks[0].list_id, "true");
        assert_eq!(tasks[0].order, 3);

        assert!(!tasks[1].completed);
        assert_eq!(tasks[1].order, 2);

        assert!(!tasks[2].completed);
        assert_eq!(tasks[2].order, 0);
        assert_eq!(tasks[2].created_at, Some(Value::Null));
    }

    #[test]
    fn test_decode_skips_non_object_elements() {
        let text = r#"[{"id":"1","taskListId":"L1"}, 5, "str", null, {"id":"2","taskListId":"L1"}]"#;
        let tasks: Vec<Task> = decode(text);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let mut with_extra = task("2", "L2", "");
        with_extra.extra.insert("parentTaskId".to_string(), json!("1"));
        with_extra.created_at = Some(json!("2025-01-01T00:00:00.000Z"));
        let mut done = task("3", "L1", "done");
        done.completed = true;
        done.order = -4;

        let records = vec![task("1", "L1", "Buy milk"), with_extra, done];
        let decoded: Vec<Task> = decode(&encode(&records).unwrap());
        assert_eq!(decoded, records);

        let empty: Vec<Task> = Vec::new();
        assert!(decode::<Task>(&encode(&empty).unwrap()).is_empty());
    }

    #[test]
    fn test_unknown_fields_are_carried() {
        let text = r#"[{"id":"1","taskListId":"L1","parentTaskId":"0","updatedAt":"2025"}]"#;
        let tasks: Vec<Task> = decode(text);
        assert_eq!(tasks[0].extra.get("parentTaskId"), Some(&json!("0")));

        let encoded: Value = serde_json::from_str(&encode(&tasks).unwrap()).unwrap();
        assert_eq!(encoded[0]["parentTaskId"], "0");
        assert_eq!(encoded[0]["updatedAt"], "2025");
    }

    #[test]
    fn test_decode_task_lists() {
        let lists: Vec<TaskList> = decode(r#"[{"id":"L1","name":"Groceries","userId":"a@b"},{"id":"L2"}]"#);
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(lists[1].name, "");
    }

    #[test]
    fn test_created_at_of_any_shape_round_trips() {
        let text = r#"[{"id":"1","createdAt":{"seconds":1,"nanoseconds":0}},{"id":"2","createdAt":1700000000000},{"id":"3","createdAt":null},{"id":"4"}]"#;
        let tasks: Vec<Task> = decode(text);
        assert_eq!(tasks[0].created_at, Some(json!({"seconds": 1, "nanoseconds": 0})));
        assert_eq!(tasks[1].created_at, Some(json!(1700000000000i64)));
        assert_eq!(tasks[2].created_at, Some(Value::Null));
        assert_eq!(tasks[3].created_at, None);

        let encoded: Value = serde_json::from_str(&encode(&tasks).unwrap()).unwrap();
        assert_eq!(encoded[0]["createdAt"]["seconds"], 1);
        assert_eq!(encoded[1]["createdAt"], 1700000000000i64);
        assert!(encoded[2]["createdAt"].is_null());
        assert!(encoded[2].get("createdAt").is_some());
        assert!(encoded[3].get("createdAt").is_none());
    }

    #[test]
    fn test_string_field_on_raw_elements() {
        let raw = decode_raw(r#"[{"taskListId":"L1"},{"taskListId":12},{},7]"#);
        assert_eq!(string_field(&raw[0], "taskListId"), "L1");
        assert_eq!(string_field(&raw[1], "taskListId"), "12");
        assert_eq!(string_field(&raw[2], "taskListId"), "");
        assert_eq!(string_field(&raw[3], "taskListId"), "");
    }

    #[test]
    fn test_encode_raw_keeps_element_text() {
        let text = r#"[{"z":1,"a":2,"taskListId":"L2"},{"order":12345678901234567890123,"n":1e2,"f":1.10},"s"]"#;
        let raw = decode_raw(text);
        assert_eq!(raw.len(), 3);
        assert_eq!(encode_raw(&raw).unwrap(), text);
    }
}
