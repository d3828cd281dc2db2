//! Text-like blocks edited by the surface's built-in tools.
//!
//! Paragraph, header, list, quote, table, code, embed, link, raw, delimiter,
//! and anything unrecognised. The surface owns their editing UI; the handler
//! just keeps the latest data.

use courseware_common::BlockType;
use serde_json::{Map, Value};

use crate::handler::{BlockHandler, BlockView};

#[derive(Debug, Clone, PartialEq)]
pub struct TextTool {
    block_type: BlockType,
    data: Value,
}

impl TextTool {
    pub fn new(block_type: BlockType, data: &Value) -> Self {
        let mut tool = Self {
            block_type,
            data: Value::Null,
        };
        tool.set_data(data.clone());
        tool
    }

    /// Replace the stored data. `null` becomes an empty object.
    pub fn set_data(&mut self, data: Value) {
        self.data = match data {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
    }
}

impl BlockHandler for TextTool {
    fn block_type(&self) -> BlockType {
        self.block_type.clone()
    }

    fn render(&self) -> BlockView {
        BlockView::Content {
            block_type: self.block_type.clone(),
            data: self.data.clone(),
        }
    }

    fn save(&self) -> Value {
        self.data.clone()
    }

    fn validate(&self, saved: &Value) -> bool {
        match self.block_type {
            BlockType::Paragraph => saved
                .get("text")
                .and_then(Value::as_str)
                .is_some_and(|text| !text.trim().is_empty()),
            _ => true,
        }
    }
}
