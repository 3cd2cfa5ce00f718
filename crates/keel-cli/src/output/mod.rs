use keel_core::DiffEntry;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

const MAX_CELL_WIDTH: usize = 60;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(&serde_json::to_value(value)?)),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Render a diff list as `path / type / before / after` rows.
#[must_use]
pub fn render_diff(diffs: &[DiffEntry]) -> String {
    if diffs.is_empty() {
        return String::from("(no changes)");
    }
    let rows = diffs
        .iter()
        .map(|entry| {
            vec![
                entry.path.to_string(),
                entry.kind().as_str().to_string(),
                entry.before().map_or_else(|| "-".to_string(), value_to_cell),
                entry.after().map_or_else(|| "-".to_string(), value_to_cell),
            ]
        })
        .collect::<Vec<_>>();
    table::render_rows(&["path", "type", "before", "after"], &rows, MAX_CELL_WIDTH)
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_array_table(items),
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            table::render_rows(&["key", "value"], &rows, MAX_CELL_WIDTH)
        }
        scalar => value_to_cell(scalar),
    }
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let mut headers = Vec::<&str>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    if headers.is_empty() {
        let rows = items.iter().map(|item| vec![value_to_cell(item)]).collect::<Vec<_>>();
        return table::render_rows(&["value"], &rows, MAX_CELL_WIDTH);
    }

    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|header| {
                    item.get(*header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_rows(&headers, &rows, MAX_CELL_WIDTH)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::String(v) => v.clone(),
        other => other.to_string(),
    }
}
