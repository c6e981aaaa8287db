//! Input sources.
//!
//! Only the filesystem source exists today: every document is a JSON file
//! under the project root. A trait can be introduced once a second backend
//! (e.g. the hosted database behind the admin API) needs validating.

pub mod fs;

use serde_json::Value;

/// JSON type name used in shape-mismatch messages.
#[must_use]
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
