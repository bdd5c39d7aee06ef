//! Output formatting utilities for fsrctl

use crate::cli::OutputFormat;
use colored::*;
use fsr_core::{SimpleView, View};
use serde_json::{Map, Value};
use tabled::builder::Builder;

/// Render a result in the requested format after applying the view.
///
/// Never fails: anything a format cannot express falls back to the
/// value's plain string form.
pub fn render(data: Value, format: OutputFormat, columns: Option<&[String]>, view: View) -> String {
    let data = SimpleView::default().apply(data, view);

    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| plain(&data))
        }
        OutputFormat::Yaml => serde_yaml::to_string(&data)
            .map(|yaml| yaml.trim_end().to_string())
            .unwrap_or_else(|_| plain(&data)),
        OutputFormat::Table => render_table(&data, columns).unwrap_or_else(|| plain(&data)),
    }
}

/// Render and print to stdout
pub fn print(data: Value, format: OutputFormat, columns: Option<&[String]>, view: View) {
    println!("{}", render(data, format, columns, view));
}

/// Build a table from an object (one row) or an array of objects.
///
/// Returns `None` for shapes that are not tabular.
fn render_table(data: &Value, columns: Option<&[String]>) -> Option<String> {
    let rows: Vec<&Map<String, Value>> = match data {
        Value::Object(record) => vec![record],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => return None,
    };

    let columns: Vec<String> = match columns {
        Some(columns) if !columns.is_empty() => columns.to_vec(),
        _ => rows.first()?.keys().cloned().collect(),
    };

    let mut records = Vec::with_capacity(rows.len() + 1);
    records.push(columns.clone());
    for row in rows {
        records.push(
            columns
                .iter()
                .map(|column| row.get(column).map(cell).unwrap_or_default())
                .collect(),
        );
    }

    Some(Builder::from(records).build().to_string())
}

/// Table cells show strings bare and everything else as compact JSON
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => plain(other),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split a comma-separated column list
pub fn parse_columns(columns: Option<&str>) -> Option<Vec<String>> {
    columns.map(|columns| {
        columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    })
}

pub fn success(message: &str) {
    eprintln!("{}", format!("✓ {}", message).green().bold());
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_pretty_with_two_spaces() {
        let out = render(json!({"a": 1}), OutputFormat::Json, None, View::Full);
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_json_simple_view() {
        let data = json!({
            "a": 1,
            "b": "",
            "c": [],
            "d": null,
            "e": {"@type": "Person", "firstname": "A", "lastname": "B"}
        });
        let out = render(data, OutputFormat::Json, None, View::Simple);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"a": 1, "e": "A B"}));
    }

    #[test]
    fn test_yaml_output() {
        let out = render(json!({"name": "x", "count": 2}), OutputFormat::Yaml, None, View::Full);
        assert!(out.contains("name: x"));
        assert!(out.contains("count: 2"));
    }

    #[test]
    fn test_table_single_record_and_missing_keys() {
        let data = json!([{"name": "one", "severity": "High"}, {"name": "two"}]);
        let columns = vec!["name".to_string(), "severity".to_string()];
        let out = render(data, OutputFormat::Table, Some(&columns), View::Full);

        assert!(out.contains("name"));
        assert!(out.contains("severity"));
        assert!(out.contains("High"));
        assert!(out.contains("two"));

        let out = render(json!({"id": 7, "name": "solo"}), OutputFormat::Table, None, View::Full);
        assert!(out.contains("id"));
        assert!(out.contains("solo"));
        assert!(!out.contains("\"solo\""));
    }

    #[test]
    fn test_server_key_order_kept() {
        let record = || json!({"name": "n", "id": 1, "severity": "High"});

        let table = render(record(), OutputFormat::Table, None, View::Full);
        let header = table.lines().find(|line| line.contains("name")).unwrap();
        let name = header.find("name").unwrap();
        let id = header.find("id").unwrap();
        let severity = header.find("severity").unwrap();
        assert!(name < id && id < severity, "header: {}", header);

        let json = render(record(), OutputFormat::Json, None, View::Simple);
        assert!(json.find("\"name\"").unwrap() < json.find("\"id\"").unwrap());

        let yaml = render(record(), OutputFormat::Yaml, None, View::Full);
        assert!(yaml.starts_with("name: n"));
    }

    #[test]
    fn test_table_fallbacks() {
        assert_eq!(render(json!("plain"), OutputFormat::Table, None, View::Simple), "plain");
        assert_eq!(render(json!(42), OutputFormat::Table, None, View::Full), "42");
        assert_eq!(render(json!([]), OutputFormat::Table, None, View::Full), "[]");
        assert_eq!(render(json!([1, 2]), OutputFormat::Table, None, View::Full), "[1,2]");
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(cell(&json!(null)), "");
        assert_eq!(cell(&json!("abc")), "abc");
        assert_eq!(cell(&json!(["a", "b"])), "[\"a\",\"b\"]");
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!(
            parse_columns(Some("name, severity,,status")),
            Some(vec!["name".to_string(), "severity".to_string(), "status".to_string()])
        );
        assert_eq!(parse_columns(None), None);
    }
}
