//! The closed catalog of block handlers.
//!
//! Every block type maps to exactly one handler. Types the catalog doesn't
//! know get a passthrough text handler so they survive a load/save cycle.

mod comparison;
mod image;
mod media;
mod social;
mod text;

pub use comparison::{ComparisonData, ComparisonEdit, ComparisonTool, Side};
pub use image::ImageTool;
pub use media::MediaTool;
pub use social::SocialEmbedTool;
pub use text::TextTool;

use courseware_common::{Block, BlockType, SocialPlatform};
use serde_json::Value;

use crate::handler::{BlockHandler, BlockView};
use crate::upload::MediaKind;

/// One entry of the tool catalog offered to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub block_type: BlockType,
    /// Toolbox title
    pub title: &'static str,
    /// Upload kind, for tools with a file picker
    pub upload: Option<MediaKind>,
}

/// Tools registered with every editor session, in toolbox order.
pub fn catalog() -> Vec<ToolSpec> {
    BlockType::KNOWN
        .into_iter()
        .map(|block_type| ToolSpec {
            title: tool_title(&block_type),
            upload: upload_kind(&block_type),
            block_type,
        })
        .collect()
}

fn tool_title(block_type: &BlockType) -> &'static str {
    match block_type {
        BlockType::Paragraph => "Text",
        BlockType::Header => "Heading",
        BlockType::List => "List",
        BlockType::Quote => "Quote",
        BlockType::Image => "Image",
        BlockType::Video => "Video",
        BlockType::Audio => "Audio",
        BlockType::Table => "Table",
        BlockType::Embed => "Embed",
        BlockType::Link => "Link",
        BlockType::Raw => "Raw HTML",
        BlockType::Code => "Code",
        BlockType::Delimiter => "Delimiter",
        BlockType::Comparison => "Comparison",
        BlockType::Twitter => "Twitter",
        BlockType::Facebook => "Facebook",
        BlockType::YouTube => "YouTube",
        BlockType::Other(_) => "Unknown",
    }
}

fn upload_kind(block_type: &BlockType) -> Option<MediaKind> {
    match block_type {
        BlockType::Image => Some(MediaKind::Image),
        BlockType::Video => Some(MediaKind::Video),
        BlockType::Audio => Some(MediaKind::Audio),
        _ => None,
    }
}

/// A handler from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolHandler {
    Text(TextTool),
    Comparison(ComparisonTool),
    Image(ImageTool),
    Media(MediaTool),
    Social(SocialEmbedTool),
}

impl ToolHandler {
    /// Pick the handler for a block and load its data.
    pub fn for_block(block: &Block) -> Self {
        let data = &block.data;
        match &block.block_type {
            BlockType::Comparison => ToolHandler::Comparison(ComparisonTool::new(data)),
            BlockType::Image => ToolHandler::Image(ImageTool::new(data)),
            BlockType::Video => ToolHandler::Media(MediaTool::new(MediaKind::Video, data)),
            BlockType::Audio => ToolHandler::Media(MediaTool::new(MediaKind::Audio, data)),
            BlockType::Twitter => {
                ToolHandler::Social(SocialEmbedTool::new(SocialPlatform::Twitter, data))
            }
            BlockType::Facebook => {
                ToolHandler::Social(SocialEmbedTool::new(SocialPlatform::Facebook, data))
            }
            BlockType::YouTube => {
                ToolHandler::Social(SocialEmbedTool::new(SocialPlatform::YouTube, data))
            }
            text @ (BlockType::Paragraph
            | BlockType::Header
            | BlockType::List
            | BlockType::Quote
            | BlockType::Table
            | BlockType::Embed
            | BlockType::Link
            | BlockType::Raw
            | BlockType::Code
            | BlockType::Delimiter
            | BlockType::Other(_)) => ToolHandler::Text(TextTool::new(text.clone(), data)),
        }
    }

    /// Upload kind if this handler accepts files.
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            ToolHandler::Image(_) => Some(MediaKind::Image),
            ToolHandler::Media(tool) => Some(tool.kind()),
            _ => None,
        }
    }

    /// Apply a completed upload. Returns `false` for handlers without a picker
    /// and for media sources that aren't absolute `http(s)` URLs.
    pub fn apply_upload(&mut self, url: String, name: Option<String>) -> bool {
        match self {
            ToolHandler::Image(tool) => {
                tool.apply_upload(url);
                true
            }
            ToolHandler::Media(tool) => tool.apply_upload(url, name),
            _ => false,
        }
    }

    fn as_handler(&self) -> &dyn BlockHandler {
        match self {
            ToolHandler::Text(tool) => tool,
            ToolHandler::Comparison(tool) => tool,
            ToolHandler::Image(tool) => tool,
            ToolHandler::Media(tool) => tool,
            ToolHandler::Social(tool) => tool,
        }
    }
}

impl BlockHandler for ToolHandler {
    fn block_type(&self) -> BlockType {
        self.as_handler().block_type()
    }

    fn render(&self) -> BlockView {
        self.as_handler().render()
    }

    fn save(&self) -> Value {
        self.as_handler().save()
    }

    fn validate(&self, saved: &Value) -> bool {
        self.as_handler().validate(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_known_type_has_a_matching_handler() {
        for block_type in BlockType::KNOWN {
            let handler = ToolHandler::for_block(&Block::new(block_type.clone(), json!({})));
            assert_eq!(handler.block_type(), block_type);
        }
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let block = Block::new(BlockType::from("unknown_widget"), json!({"foo": [1, 2]}));
        let handler = ToolHandler::for_block(&block);
        assert!(matches!(handler, ToolHandler::Text(_)));
        assert_eq!(handler.block_type().as_str(), "unknown_widget");
        assert_eq!(handler.save(), json!({"foo": [1, 2]}));
    }

    #[test]
    fn test_catalog_lists_upload_tools() {
        let catalog = catalog();
        assert_eq!(catalog.len(), BlockType::KNOWN.len());
        let uploads: Vec<_> = catalog
            .iter()
            .filter_map(|spec| spec.upload.map(|kind| (spec.block_type.clone(), kind)))
            .collect();
        assert_eq!(
            uploads,
            vec![
                (BlockType::Image, MediaKind::Image),
                (BlockType::Video, MediaKind::Video),
                (BlockType::Audio, MediaKind::Audio),
            ]
        );
    }

    #[test]
    fn test_apply_upload_only_for_pickers() {
        let mut video = ToolHandler::for_block(&Block::new(BlockType::Video, json!({})));
        assert!(video.apply_upload("https://cdn.example.com/v.mp4".into(), None));
        assert_eq!(video.save(), json!({"url": "https://cdn.example.com/v.mp4"}));

        let mut quote = ToolHandler::for_block(&Block::new(BlockType::Quote, json!({"text": "x"})));
        assert!(!quote.apply_upload("https://cdn.example.com/v.mp4".into(), None));
        assert_eq!(quote.media_kind(), None);
    }
}
