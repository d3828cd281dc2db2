//! Image block: `{ file: { url }, caption, withBorder, stretched, withBackground }`.

use courseware_common::BlockType;
use serde_json::{Map, Value, json};

use crate::handler::{BlockHandler, BlockView, ImageView};
use crate::upload::MediaKind;

const FLAGS: [&str; 3] = ["withBorder", "stretched", "withBackground"];

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTool {
    data: Map<String, Value>,
}

impl ImageTool {
    pub fn new(data: &Value) -> Self {
        let data = data.as_object().cloned().unwrap_or_default();
        Self { data }
    }

    pub fn url(&self) -> Option<&str> {
        self.data
            .get("file")
            .and_then(|file| file.get("url"))
            .or_else(|| self.data.get("url"))
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
    }

    pub fn caption(&self) -> &str {
        self.data
            .get("caption")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn set_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        self.apply_upload(url.to_string());
        true
    }

    /// Replace the file; caption and display flags are kept.
    pub fn apply_upload(&mut self, url: String) {
        self.data.remove("url");
        self.data.insert("file".into(), json!({ "url": url }));
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.data
            .insert("caption".into(), Value::String(caption.into()));
    }
}

impl BlockHandler for ImageTool {
    fn block_type(&self) -> BlockType {
        BlockType::Image
    }

    fn render(&self) -> BlockView {
        BlockView::Image(ImageView {
            picker: MediaKind::Image.into(),
            url: self.url().map(str::to_string),
            caption: self.caption().to_string(),
        })
    }

    fn save(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("caption".into(), Value::String(self.caption().to_string()));
        for flag in FLAGS {
            let set = data.get(flag).and_then(Value::as_bool).unwrap_or(false);
            data.insert(flag.into(), Value::Bool(set));
        }
        Value::Object(data)
    }

    fn validate(&self, saved: &Value) -> bool {
        saved
            .pointer("/file/url")
            .and_then(Value::as_str)
            .is_some_and(|url| !url.trim().is_empty())
    }
}
