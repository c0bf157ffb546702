//! Markdown rendering helpers.

use serde_json::Value;

/// Text of a table cell: strings unquoted, `null` blank, everything else
/// as compact JSON. Pipes are escaped.
pub fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace('|', "\\|")
}

/// GitHub-flavoured markdown table; empty when `header` is empty.
pub fn markdown_table(header: &[Value], rows: &[Vec<Value>]) -> String {
    if header.is_empty() {
        return String::new();
    }
    let line = |cells: &[Value]| {
        let texts: Vec<String> = cells.iter().map(cell_text).collect();
        format!("| {} |\n", texts.join(" | "))
    };

    let mut out = line(header);
    out.push_str(&format!("|{}\n", " --- |".repeat(header.len())));
    for row in rows {
        out.push_str(&line(row));
    }
    out
}
