use super::model::{Routine, Step};
use serde_json::Value;

/// Turn the planner's raw `routine` field into a [`Routine`].
///
/// Arrays become steps with `notify` cleared; upstream notify flags are
/// discarded. Any other usable value is kept as opaque text. Returns `None`
/// when there is nothing to show: missing/`null`, `false`, a blank string or
/// an empty array.
pub fn normalize(payload: Value) -> Option<Routine> {
    match payload {
        Value::Null | Value::Bool(false) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(Routine::Steps(items.into_iter().map(step_from).collect())),
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(Routine::Text(text)),
        other => Some(Routine::Text(other.to_string())),
    }
}

fn step_from(item: Value) -> Step {
    match item {
        Value::Object(fields) => Step {
            time: fields.get("time").map(field_text).unwrap_or_default(),
            message: fields.get("message").map(field_text).unwrap_or_default(),
            notify: false,
        },
        Value::String(text) => Step::new(String::new(), text),
        other => Step::new(String::new(), other.to_string()),
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
