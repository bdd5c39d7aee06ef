//! Command handlers

pub mod alerts;
pub mod config;
pub mod files;
pub mod http;

use fsr_core::errors::{FsrError, FsrResult};
use serde_json::{Map, Value};

/// Ask a yes/no question, defaulting to no
pub(crate) fn confirm(prompt: &str) -> FsrResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| FsrError::Usage(format!("Prompt failed: {}", e)))
}

/// Split a comma-separated option into trimmed, non-empty items
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Collect the supplied optional string fields into a JSON object
pub(crate) fn present_fields<'a, I>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, Option<String>)>,
{
    fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), Value::String(value))))
        .collect()
}

/// Extract the `hydra:member` collection from a list response
pub(crate) fn members(collection: Value) -> Value {
    match collection {
        Value::Object(mut map) => map
            .remove("hydra:member")
            .unwrap_or_else(|| Value::Array(Vec::new())),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("a, b,,c")), vec!["a", "b", "c"]);
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_present_fields() {
        let fields = present_fields([("name", Some("x".to_string())), ("status", None)]);
        assert_eq!(Value::Object(fields), json!({"name": "x"}));
    }

    #[test]
    fn test_members() {
        assert_eq!(members(json!({"hydra:member": [1]})), json!([1]));
        assert_eq!(members(json!({"other": true})), json!([]));
        assert_eq!(members(json!([2])), json!([2]));
    }
}
