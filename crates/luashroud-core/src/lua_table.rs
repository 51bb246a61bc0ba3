//! Rendering of JSON values as Lua table constructors.
//!
//! Mappings use `key = value;` entries, falling back to `["key"] = value;` when the
//! key is not a bare Lua identifier. Sequences use comma-separated entries.

use serde_json::{Map, Value};

const INDENT: &str = "  ";

const RESERVED_WORDS: [&str; 21] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until",
];

/// Render a value as a Lua expression.
#[must_use]
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// Render a map as a Lua chunk that returns the table.
#[must_use]
pub fn render_map_chunk(entries: &Map<String, Value>) -> String {
    let mut out = String::from("return ");
    write_map(&mut out, entries, 0);
    out
}

/// Whether `key` can be written without brackets.
#[must_use]
pub fn is_bare_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') && !RESERVED_WORDS.contains(&key)
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("nil"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_string(out, text),
        Value::Array(items) => write_array(out, items, depth),
        Value::Object(entries) => write_map(out, entries, depth),
    }
}

fn write_array(out: &mut String, items: &[Value], depth: usize) {
    if items.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(",\n");
        }
        push_indent(out, depth + 1);
        write_value(out, item, depth + 1);
    }
    out.push('\n');
    push_indent(out, depth);
    out.push('}');
}

fn write_map(out: &mut String, entries: &Map<String, Value>, depth: usize) {
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (key, value) in entries {
        push_indent(out, depth + 1);
        if is_bare_identifier(key) {
            out.push_str(key);
        } else {
            out.push('[');
            write_string(out, key);
            out.push(']');
        }
        out.push_str(" = ");
        write_value(out, value, depth + 1);
        out.push_str(";\n");
    }
    push_indent(out, depth);
    out.push('}');
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_ascii_control() => {
                out.push_str(&format!("\\{:03}", u32::from(ch)));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
