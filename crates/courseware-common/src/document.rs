//! The stored block document format.
//!
//! A document is persisted as `{ "blocks": [ { "type": ..., "data": ... }, ... ] }`.
//! Block order is render order and edit order. Any other top-level fields
//! (`time`, `version`, ...) are carried through untouched.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::error::CoursewareError;

/// The kind of a block.
///
/// The set of known kinds is closed. Anything else is kept as `Other` so that
/// documents written by newer tools still load and render (as a raw dump).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    Header,
    List,
    Quote,
    Image,
    Video,
    Audio,
    Table,
    Embed,
    Link,
    Raw,
    Code,
    Delimiter,
    Comparison,
    Twitter,
    Facebook,
    YouTube,
    Other(SmolStr),
}

impl BlockType {
    /// Every known block kind, in catalog order.
    pub const KNOWN: [BlockType; 17] = [
        BlockType::Paragraph,
        BlockType::Header,
        BlockType::List,
        BlockType::Quote,
        BlockType::Image,
        BlockType::Video,
        BlockType::Audio,
        BlockType::Table,
        BlockType::Embed,
        BlockType::Link,
        BlockType::Raw,
        BlockType::Code,
        BlockType::Delimiter,
        BlockType::Comparison,
        BlockType::Twitter,
        BlockType::Facebook,
        BlockType::YouTube,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Header => "header",
            BlockType::List => "list",
            BlockType::Quote => "quote",
            BlockType::Image => "image",
            BlockType::Video => "video",
            BlockType::Audio => "audio",
            BlockType::Table => "table",
            BlockType::Embed => "embed",
            BlockType::Link => "link",
            BlockType::Raw => "raw",
            BlockType::Code => "code",
            BlockType::Delimiter => "delimiter",
            BlockType::Comparison => "comparison",
            BlockType::Twitter => "twitter",
            BlockType::Facebook => "facebook",
            BlockType::YouTube => "youtube",
            BlockType::Other(tag) => tag.as_str(),
        }
    }

    /// Whether this is one of the known kinds.
    pub fn is_known(&self) -> bool {
        !matches!(self, BlockType::Other(_))
    }
}

impl From<&str> for BlockType {
    fn from(tag: &str) -> Self {
        match tag {
            "paragraph" => BlockType::Paragraph,
            "header" => BlockType::Header,
            "list" => BlockType::List,
            "quote" => BlockType::Quote,
            "image" => BlockType::Image,
            "video" => BlockType::Video,
            "audio" => BlockType::Audio,
            "table" => BlockType::Table,
            "embed" => BlockType::Embed,
            "link" => BlockType::Link,
            "raw" => BlockType::Raw,
            "code" => BlockType::Code,
            "delimiter" => BlockType::Delimiter,
            "comparison" => BlockType::Comparison,
            "twitter" => BlockType::Twitter,
            "facebook" => BlockType::Facebook,
            "youtube" => BlockType::YouTube,
            other => BlockType::Other(SmolStr::new(other)),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BlockType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = SmolStr::deserialize(deserializer)?;
        Ok(BlockType::from(tag.as_str()))
    }
}

/// One content unit of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Persisted block id, if the editing tool assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SmolStr>,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Type-specific payload. Shape is owned by the handler for `block_type`.
    #[serde(default)]
    pub data: Value,
    /// Anything else stored alongside the block (tunes etc).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn new(block_type: BlockType, data: Value) -> Self {
        Self {
            id: None,
            block_type,
            data,
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<SmolStr>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// String field from `data`, if present and a string.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// An ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn from_json(json: &str) -> Result<Self, CoursewareError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CoursewareError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Value {
        // Only string keys and JSON values in here, so this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl<'a> IntoIterator for &'a BlockDocument {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_type_tags() {
        for known in BlockType::KNOWN {
            assert_eq!(BlockType::from(known.as_str()), known);
            assert!(known.is_known());
        }
        let unknown = BlockType::from("unknown_widget");
        assert_eq!(unknown, BlockType::Other("unknown_widget".into()));
        assert_eq!(unknown.as_str(), "unknown_widget");
        assert!(!unknown.is_known());
    }

    #[test]
    fn test_document_preserves_order_and_extra_fields() {
        let json = r#"{"time":1700000000,"blocks":[{"id":"a1","type":"header","data":{"text":"Intro","level":2}},{"type":"unknown_widget","data":{"x":1}},{"type":"paragraph","data":{"text":"Body"}}],"version":"2.28.0"}"#;
        let doc = BlockDocument::from_json(json).unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks[0].id.as_deref(), Some("a1"));
        assert_eq!(doc.blocks[0].block_type, BlockType::Header);
        assert_eq!(doc.blocks[1].block_type.as_str(), "unknown_widget");
        assert_eq!(doc.blocks[2].data_str("text"), Some("Body"));
        assert_eq!(doc.extra.get("version"), Some(&json!("2.28.0")));

        let value = doc.to_value();
        assert_eq!(value["blocks"][1]["type"], json!("unknown_widget"));
        assert_eq!(value["time"], json!(1700000000));
        assert!(value["blocks"][2].get("id").is_none());
    }

    #[test]
    fn test_empty_document() {
        let doc = BlockDocument::from_json(r#"{"blocks":[]}"#).unwrap();
        assert!(doc.is_empty());
        let doc = BlockDocument::from_json("{}").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_block_without_data_defaults_to_null() {
        let doc = BlockDocument::from_json(r#"{"blocks":[{"type":"delimiter"}]}"#).unwrap();
        assert_eq!(doc.blocks[0].data, Value::Null);
        assert_eq!(doc.blocks[0].data_str("text"), None);
    }
}
