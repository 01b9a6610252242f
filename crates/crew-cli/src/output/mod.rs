use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Leading columns for list tables, in this order. Other keys follow sorted.
const LEADING_COLUMNS: &[&str] = &[
    "id",
    "title",
    "status",
    "priority",
    "assignee",
    "claimed_by",
    "claimed_at",
];

/// Long-form keys left out of list tables; `task get` shows them.
const LIST_HIDDEN: &[&str] = &["description", "metadata", "detail"];

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => {
            let headers = ["key", "value"];
            let mut entries = flatten_claim(map).into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
        Value::Null => Ok(String::from("(none)")),
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
    }
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let headers = ["value"];
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&headers, &rows, table_options());
    }

    let maps = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| flatten_claim(map.clone()))
        .collect::<Vec<_>>();

    let headers = list_headers(&maps);
    if headers.is_empty() {
        return String::from("(no columns)");
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = maps
        .iter()
        .map(|map| {
            headers
                .iter()
                .map(|header| {
                    map.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, table_options())
}

fn list_headers(maps: &[Map<String, Value>]) -> Vec<String> {
    let mut rest = Vec::<String>::new();
    for map in maps {
        for key in map.keys() {
            if !LEADING_COLUMNS.contains(&key.as_str())
                && !LIST_HIDDEN.contains(&key.as_str())
                && !rest.contains(key)
            {
                rest.push(key.clone());
            }
        }
    }
    rest.sort();

    LEADING_COLUMNS
        .iter()
        .filter(|column| maps.iter().any(|map| map.contains_key(**column)))
        .map(|column| (*column).to_string())
        .chain(rest)
        .collect()
}

/// Lift a task's nested `claim` into `claimed_by`/`claimed_at` cells.
fn flatten_claim(mut map: Map<String, Value>) -> Map<String, Value> {
    match map.remove("claim") {
        Some(Value::Object(claim)) => {
            for (key, value) in claim {
                map.insert(key, value);
            }
        }
        Some(Value::Null) => {
            map.insert("claimed_by".into(), Value::Null);
        }
        Some(other) => {
            map.insert("claim".into(), other);
        }
        None => {}
    }
    map
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
