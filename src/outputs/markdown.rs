//! Markdown rendering of an article table.
//!
//! One header row from the table's columns, one body row per article.
//! Cells are flattened to a single line:
//!
//! - strings are shown as-is, `null` and missing fields as an empty cell
//! - a NewsAPI `source` object (`{"id": .., "name": ..}`) is shown by its name
//! - any other nested value is shown as compact JSON
//!
//! Pipes are escaped and line breaks collapsed so the table stays intact.

use crate::models::ArticleTable;
use crate::utils::truncate_chars;
use serde_json::Value;
use std::fmt::Write;

/// Render `table` as a GitHub-flavored Markdown table.
///
/// Each cell is truncated to `max_cell` characters. An empty table renders
/// as a single `_No articles found._` line.
pub fn table_to_markdown(table: &ArticleTable, max_cell: usize) -> String {
    if table.is_empty() {
        return String::from("_No articles found._\n");
    }

    let mut md = String::new();
    let header = table
        .columns()
        .iter()
        .map(|c| escape_cell(c))
        .collect::<Vec<_>>();
    writeln!(md, "| {} |", header.join(" | ")).ok();
    writeln!(md, "|{}", " --- |".repeat(header.len())).ok();

    for row in table.rows() {
        let cells = table
            .columns()
            .iter()
            .map(|c| {
                let text = row.get(c).map(cell_text).unwrap_or_default();
                escape_cell(&truncate_chars(&text, max_cell))
            })
            .collect::<Vec<_>>();
        writeln!(md, "| {} |", cells.join(" | ")).ok();
    }

    md
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
