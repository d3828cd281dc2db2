//! The block handler capability set and the views handlers render to.
//!
//! A handler owns exactly one block while it is being edited. `render`
//! describes what the UI layer should show, `save` produces the block's
//! stored `data`, and `validate` gives advisory feedback on saved data.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use courseware_common::{BlockType, SocialPlatform};
use serde_json::Value;

use crate::upload::MediaKind;

/// Edit/save/validate behaviour for one block.
pub trait BlockHandler {
    fn block_type(&self) -> BlockType;

    /// Describe the editing UI for the current state.
    fn render(&self) -> BlockView;

    /// Current block data, in the stored shape for this block type.
    fn save(&self) -> Value;

    /// Advisory check of saved data. Never blocks saving.
    fn validate(&self, _saved: &Value) -> bool {
        true
    }
}

/// Set while the owning handler is alive.
///
/// Async work started by a handler (uploads) keeps a clone and checks it
/// before touching handler state again.
#[derive(Debug, Clone)]
pub struct MountFlag(Arc<AtomicBool>);

impl MountFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Framework-agnostic description of a block's editing UI.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockView {
    /// Text-like blocks edited by the surface's own tools.
    Content { block_type: BlockType, data: Value },
    Comparison(ComparisonView),
    Image(ImageView),
    Media(MediaView),
    Embed(EmbedView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonView {
    pub left_title: String,
    pub right_title: String,
    pub left_points: Vec<String>,
    pub right_points: Vec<String>,
}

/// File input descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePicker {
    /// `accept` filter, e.g. `video/*`
    pub accept: &'static str,
    /// Multipart field name the file is uploaded under
    pub field: &'static str,
}

impl From<MediaKind> for FilePicker {
    fn from(kind: MediaKind) -> Self {
        Self {
            accept: kind.accept(),
            field: kind.field_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub picker: FilePicker,
    /// Current image URL, if one has been set
    pub url: Option<String>,
    pub caption: String,
}

/// Video/audio editing UI: picker and URL field are shown together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaView {
    pub kind: MediaKind,
    pub picker: FilePicker,
    /// Value shown in the URL input
    pub url_input: String,
    /// Player source once a URL is set
    pub source: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedView {
    /// URL input, shown while no URL is set or after "Edit"
    Input {
        platform: SocialPlatform,
        placeholder: &'static str,
        value: String,
    },
    /// Embedded frame for a recognised post/video URL
    Frame {
        platform: SocialPlatform,
        src: String,
        url: String,
    },
    /// Plain link when no frame can be derived from the URL
    Link { platform: SocialPlatform, url: String },
}
