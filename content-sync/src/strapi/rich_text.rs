//! Plain-text rendering of Strapi rich-text ("blocks") fields.

use serde_json::Value;

/// Flattens a rich-text value to plain text.
///
/// Strings pass through. Block arrays render one line per top-level block,
/// concatenating the `text` leaves found under nested `children`.
pub fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(blocks) => blocks
            .iter()
            .map(|b| {
                let mut line = String::new();
                collect_text(b, &mut line);
                line.trim().to_string()
            })
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => {
            let mut out = String::new();
            collect_text(value, &mut out);
            out.trim().to_string()
        }
        _ => String::new(),
    }
}

fn collect_text(node: &Value, out: &mut String) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(t)) = map.get("text") {
                out.push_str(t);
            }
            if let Some(Value::Array(children)) = map.get("children") {
                for child in children {
                    collect_text(child, out);
                }
                // list items and nested blocks stay readable as separate phrases
                if map.get("type").and_then(Value::as_str) == Some("list-item") {
                    out.push(' ');
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|i| collect_text(i, out)),
        Value::String(s) => out.push_str(s),
        _ => {}
    }
}

/// `true` when `value` looks like a Strapi blocks array.
pub fn is_blocks(value: &Value) -> bool {
    value.as_array().is_some_and(|a| {
        !a.is_empty()
            && a.iter()
                .all(|b| b.get("children").is_some_and(Value::is_array))
    })
}
