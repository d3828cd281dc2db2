//! Video and audio blocks.
//!
//! Data is `{ url, name?, ... }`. A file upload and a pasted URL both set the
//! source; whichever lands last wins. A new source must be an absolute
//! `http(s)` URL. Keys this tool doesn't know about are kept as they were.

use courseware_common::BlockType;
use courseware_common::url::is_http_url;
use serde_json::{Map, Value};

use crate::handler::{BlockHandler, BlockView, MediaView};
use crate::upload::MediaKind;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaTool {
    kind: MediaKind,
    data: Map<String, Value>,
}

impl MediaTool {
    pub fn new(kind: MediaKind, data: &Value) -> Self {
        let data = data.as_object().cloned().unwrap_or_default();
        Self { kind, data }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Current source URL, coerced to a string.
    pub fn url(&self) -> String {
        coerce_url(self.data.get("url"))
    }

    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }

    /// Set the source from the URL field. Blank or non-`http(s)` input is ignored.
    pub fn set_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        if !is_http_url(url) {
            return false;
        }
        self.replace_source(url.to_string(), None);
        true
    }

    /// Set the source from a completed upload.
    pub fn apply_upload(&mut self, url: String, name: Option<String>) -> bool {
        if !is_http_url(&url) {
            return false;
        }
        self.replace_source(url, name);
        true
    }

    fn replace_source(&mut self, url: String, name: Option<String>) {
        self.data.remove("name");
        self.data.insert("url".into(), Value::String(url));
        if let Some(name) = name {
            self.data.insert("name".into(), Value::String(name));
        }
    }
}

fn coerce_url(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(url)) => url.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

impl BlockHandler for MediaTool {
    fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    fn render(&self) -> BlockView {
        let url = self.url();
        let source = (!url.trim().is_empty()).then(|| url.clone());
        BlockView::Media(MediaView {
            kind: self.kind,
            picker: self.kind.into(),
            url_input: url,
            source,
            name: self.name().map(str::to_string),
        })
    }

    fn save(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("url".into(), Value::String(self.url()));
        Value::Object(data)
    }
}
