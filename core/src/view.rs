//! Result shaping for display
//!
//! The simple view drops empty fields and collapses a few well-known
//! nested record shapes into scalars. Shapes are matched through a table
//! of [`ShapeRule`]s so new ones can be added without touching the
//! filtering logic.

use serde_json::{Map, Value};
use std::fmt;

/// How much of a record to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Strip empty fields and collapse known shapes
    #[default]
    Simple,
    /// Show the record untouched
    Full,
}

/// A detector for one nested object shape and the scalar it collapses to
#[derive(Clone, Copy)]
pub struct ShapeRule {
    pub name: &'static str,
    pub collapse: fn(&Map<String, Value>) -> Option<Value>,
}

impl fmt::Debug for ShapeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRule").field("name", &self.name).finish()
    }
}

/// Shapes the remote API is known to return
pub const DEFAULT_SHAPES: &[ShapeRule] = &[
    ShapeRule {
        name: "person",
        collapse: collapse_person,
    },
    ShapeRule {
        name: "item_value",
        collapse: collapse_item_value,
    },
];

/// `{"@type": "Person", "firstname": .., "lastname": ..}` -> "first last"
fn collapse_person(object: &Map<String, Value>) -> Option<Value> {
    if object.get("@type").and_then(Value::as_str) != Some("Person") {
        return None;
    }

    let part = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let name = format!("{} {}", part("firstname"), part("lastname"));

    Some(Value::String(name.trim().to_string()))
}

/// Picklist entries carry their display value under `itemValue`
fn collapse_item_value(object: &Map<String, Value>) -> Option<Value> {
    object.get("itemValue").cloned()
}

/// Null, empty strings and empty arrays count as "no value"
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Applies a view to API results
#[derive(Debug, Clone, Copy)]
pub struct SimpleView<'a> {
    shapes: &'a [ShapeRule],
}

impl Default for SimpleView<'static> {
    fn default() -> Self {
        Self {
            shapes: DEFAULT_SHAPES,
        }
    }
}

impl<'a> SimpleView<'a> {
    /// Use a custom shape table
    pub fn with_shapes(shapes: &'a [ShapeRule]) -> Self {
        Self { shapes }
    }

    /// Shape `data` for the requested view.
    ///
    /// Only a top-level object, or the objects of a top-level array, are
    /// filtered; values below their immediate children are left alone.
    pub fn apply(&self, data: Value, view: View) -> Value {
        if view == View::Full {
            return data;
        }

        match data {
            Value::Object(record) => Value::Object(self.simplify_record(record)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(record) => Value::Object(self.simplify_record(record)),
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    fn simplify_record(&self, record: Map<String, Value>) -> Map<String, Value> {
        record
            .into_iter()
            .filter(|(_, value)| !is_empty_value(value))
            .map(|(key, value)| (key, self.collapse(value)))
            .collect()
    }

    fn collapse(&self, value: Value) -> Value {
        if let Value::Object(object) = &value {
            for shape in self.shapes {
                if let Some(collapsed) = (shape.collapse)(object) {
                    return collapsed;
                }
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_view_filters_and_collapses() {
        let data = json!({
            "a": 1,
            "b": "",
            "c": [],
            "d": null,
            "e": {"@type": "Person", "firstname": "A", "lastname": "B"}
        });

        let shaped = SimpleView::default().apply(data, View::Simple);
        assert_eq!(shaped, json!({"a": 1, "e": "A B"}));
    }

    #[test]
    fn test_full_view_untouched() {
        let data = json!({"a": null, "b": ""});
        let shaped = SimpleView::default().apply(data.clone(), View::Full);
        assert_eq!(shaped, data);
    }

    #[test]
    fn test_item_value_collapse() {
        let data = json!([
            {"severity": {"itemValue": "High", "@id": "/api/3/picklists/1"}, "name": "x"},
            {"severity": null, "name": "y"}
        ]);

        let shaped = SimpleView::default().apply(data, View::Simple);
        assert_eq!(shaped, json!([{"severity": "High", "name": "x"}, {"name": "y"}]));
    }

    #[test]
    fn test_person_with_missing_lastname_is_trimmed() {
        let data = json!({"owner": {"@type": "Person", "firstname": "Ada"}});
        let shaped = SimpleView::default().apply(data, View::Simple);
        assert_eq!(shaped, json!({"owner": "Ada"}));
    }

    #[test]
    fn test_only_immediate_children_are_shaped() {
        let data = json!({"outer": {"inner": {"itemValue": "deep"}, "empty": ""}});
        let shaped = SimpleView::default().apply(data.clone(), View::Simple);
        assert_eq!(shaped, data);
    }

    #[test]
    fn test_scalars_and_mixed_arrays_pass_through() {
        let view = SimpleView::default();
        assert_eq!(view.apply(json!("text"), View::Simple), json!("text"));
        assert_eq!(view.apply(json!([1, {"a": ""}]), View::Simple), json!([1, {}]));
    }

    #[test]
    fn test_custom_shape_table() {
        fn collapse_iri(object: &Map<String, Value>) -> Option<Value> {
            object.get("@id").cloned()
        }
        let shapes = [ShapeRule {
            name: "iri",
            collapse: collapse_iri,
        }];

        let data = json!({"file": {"@id": "/api/3/files/9", "size": 10}});
        let shaped = SimpleView::with_shapes(&shapes).apply(data, View::Simple);
        assert_eq!(shaped, json!({"file": "/api/3/files/9"}));
    }
}
