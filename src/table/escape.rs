// table/escape.rs
use serde_json::Value;

/// Quotes a text cell: internal quotes doubled, every run of line breaks
/// collapsed to one space so a row always stays on one physical line.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    let mut in_break = false;
    for c in raw.chars() {
        match c {
            '\r' | '\n' => {
                if !in_break {
                    out.push(' ');
                    in_break = true;
                }
                continue;
            }
            '"' => out.push_str("\"\""),
            other => out.push(other),
        }
        in_break = false;
    }
    out.push('"');
    out
}

/// Cell for a text-bearing source field; missing values stay empty.
pub fn text_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => escape_text(s),
        Some(other) => escape_text(&other.to_string()),
    }
}

/// Cell for a numeric or boolean source field, emitted bare when it is one.
pub fn value_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        Some(Value::String(s)) => escape_text(s),
        Some(other) => escape_text(&other.to_string()),
    }
}
