//! Plain-text excerpts for lesson cards and previews.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{Normalized, normalize};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Plain text of a document's paragraph, header, list and quote blocks.
///
/// Accepts the same inputs as [`crate::render_value`]. Markup is stripped,
/// common entities decoded and whitespace collapsed. Text longer than
/// `max_chars` is cut on a char boundary and ends with an ellipsis.
pub fn excerpt(input: &Value, max_chars: usize) -> String {
    let text = match normalize(input) {
        Normalized::Blocks(blocks) => blocks
            .iter()
            .flat_map(block_text)
            .collect::<Vec<_>>()
            .join(" "),
        Normalized::Markup(markup) => markup.to_string(),
        Normalized::Nothing => String::new(),
    };
    truncate(&plain_text(&text), max_chars)
}

fn block_text(block: &Value) -> Vec<String> {
    let data = block.get("data").unwrap_or(&Value::Null);
    let text = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
    match block.get("type").and_then(Value::as_str) {
        Some("paragraph" | "header" | "quote") => text("text").into_iter().collect(),
        Some("list") => {
            let mut out = Vec::new();
            if let Some(items) = data.get("items").and_then(Value::as_array) {
                list_text(items, &mut out);
            }
            out
        }
        _ => Vec::new(),
    }
}

fn list_text(items: &[Value], out: &mut Vec<String>) {
    for item in items {
        match item {
            Value::String(text) => out.push(text.clone()),
            Value::Object(_) => {
                if let Some(content) = item.get("content").and_then(Value::as_str) {
                    out.push(content.to_string());
                }
                if let Some(children) = item.get("items").and_then(Value::as_array) {
                    list_text(children, out);
                }
            }
            _ => {}
        }
    }
}

fn plain_text(markup: &str) -> String {
    let mut text = TAG_RE.replace_all(markup, " ").into_owned();
    for (entity, decoded) in ENTITIES {
        text = text.replace(entity, decoded);
    }
    SPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((end, _)) => {
            let mut cut = text[..end].trim_end().to_string();
            cut.push('…');
            cut
        }
    }
}
