//! courseware-renderer
//!
//! Turns a stored block document back into HTML for display. Rendering is a
//! pure function of the input and a [`RenderConfig`]: it never fails, never
//! reorders blocks, and degrades malformed or unknown blocks to a visible
//! JSON dump.
//!
//! Paragraph, header, list and table text is trusted and emitted as-is. It
//! may carry inline markup from the editor. Captions, titles and URLs are
//! escaped.

use std::borrow::Cow;

use courseware_common::{BlockDocument, RenderConfig};
use serde_json::Value;

pub mod block_renderer;
pub mod excerpt;

pub use block_renderer::{render_block, render_blocks};
pub use excerpt::excerpt;

/// Render any stored form of a document.
///
/// - a JSON string is parsed first; a string that isn't JSON is taken to be
///   already-rendered markup and returned unchanged
/// - an object renders its `blocks`
/// - an array is taken to be the blocks themselves
/// - anything else renders to an empty string
pub fn render_value(input: &Value, config: &RenderConfig) -> String {
    match normalize(input) {
        Normalized::Blocks(blocks) => render_blocks(&blocks, config),
        Normalized::Markup(markup) => markup.to_string(),
        Normalized::Nothing => String::new(),
    }
}

/// Render a document stored as text.
pub fn render_str(input: &str, config: &RenderConfig) -> String {
    match normalize_str(input) {
        Normalized::Blocks(blocks) => render_blocks(&blocks, config),
        Normalized::Markup(markup) => markup.to_string(),
        Normalized::Nothing => String::new(),
    }
}

pub fn render_document(document: &BlockDocument, config: &RenderConfig) -> String {
    render_value(&document.to_value(), config)
}

pub(crate) enum Normalized<'a> {
    Blocks(Cow<'a, [Value]>),
    Markup(&'a str),
    Nothing,
}

pub(crate) fn normalize(input: &Value) -> Normalized<'_> {
    match input {
        Value::String(text) => normalize_str(text),
        Value::Array(blocks) => Normalized::Blocks(Cow::Borrowed(blocks)),
        Value::Object(map) => match map.get("blocks") {
            Some(Value::Array(blocks)) => Normalized::Blocks(Cow::Borrowed(blocks)),
            // a lone block
            None if map.contains_key("type") => {
                Normalized::Blocks(Cow::Owned(vec![input.clone()]))
            }
            _ => Normalized::Nothing,
        },
        _ => Normalized::Nothing,
    }
}

pub(crate) fn normalize_str(input: &str) -> Normalized<'_> {
    match serde_json::from_str::<Value>(input) {
        Ok(parsed @ (Value::Array(_) | Value::Object(_))) => match normalize(&parsed) {
            Normalized::Blocks(blocks) => Normalized::Blocks(Cow::Owned(blocks.into_owned())),
            _ => Normalized::Nothing,
        },
        _ => Normalized::Markup(input),
    }
}

#[cfg(test)]
mod tests;
