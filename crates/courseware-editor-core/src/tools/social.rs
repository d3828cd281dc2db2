//! Twitter, Facebook and YouTube embed blocks.

use courseware_common::social::{self, SocialPlatform};
use courseware_common::BlockType;
use serde_json::{Map, Value};

use crate::handler::{BlockHandler, BlockView, EmbedView};

#[derive(Debug, Clone, PartialEq)]
pub struct SocialEmbedTool {
    platform: SocialPlatform,
    url: String,
    /// Stored data; keys other than `url` and `videoId` pass through.
    data: Map<String, Value>,
    /// URL input is showing instead of the embed
    editing: bool,
}

impl SocialEmbedTool {
    pub fn new(platform: SocialPlatform, data: &Value) -> Self {
        let data = data.as_object().cloned().unwrap_or_default();
        let url = data
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let mut tool = Self {
            platform,
            url,
            data,
            editing: false,
        };
        tool.editing = tool.embed().is_none() && tool.url.is_empty();
        tool
    }

    pub fn platform(&self) -> SocialPlatform {
        self.platform
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Commit a pasted URL. A blank URL leaves the input open.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.trim().to_string();
        self.data.remove("videoId");
        self.editing = self.url.is_empty();
    }

    /// Reopen the URL input.
    pub fn edit(&mut self) {
        self.editing = true;
    }

    pub fn tweet_id(&self) -> Option<&str> {
        match self.platform {
            SocialPlatform::Twitter => social::tweet_id(&self.url),
            _ => None,
        }
    }

    /// YouTube id from the URL, else the stored `videoId`.
    pub fn video_id(&self) -> Option<&str> {
        if self.platform != SocialPlatform::YouTube {
            return None;
        }
        social::youtube_video_id(&self.url).or_else(|| {
            self.data
                .get("videoId")
                .and_then(Value::as_str)
                .filter(|id| social::is_youtube_video_id(id))
        })
    }

    fn embed(&self) -> Option<String> {
        social::embed_src(self.platform, &self.url)
            .or_else(|| self.video_id().map(social::youtube_embed_src))
    }
}

impl BlockHandler for SocialEmbedTool {
    fn block_type(&self) -> BlockType {
        match self.platform {
            SocialPlatform::Twitter => BlockType::Twitter,
            SocialPlatform::Facebook => BlockType::Facebook,
            SocialPlatform::YouTube => BlockType::YouTube,
        }
    }

    fn render(&self) -> BlockView {
        let platform = self.platform;
        let embed = self.embed();
        if self.editing || (self.url.is_empty() && embed.is_none()) {
            return BlockView::Embed(EmbedView::Input {
                platform,
                placeholder: platform.placeholder(),
                value: self.url.clone(),
            });
        }
        let url = self.url.clone();
        BlockView::Embed(match embed {
            Some(src) => EmbedView::Frame { platform, src, url },
            None => EmbedView::Link { platform, url },
        })
    }

    fn save(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("url".into(), Value::String(self.url.clone()));
        if self.platform == SocialPlatform::YouTube
            && let Some(id) = social::youtube_video_id(&self.url)
        {
            data.insert("videoId".into(), Value::String(id.to_string()));
        }
        Value::Object(data)
    }

    fn validate(&self, saved: &Value) -> bool {
        let url_ok = saved
            .get("url")
            .and_then(Value::as_str)
            .is_some_and(|url| self.platform.matches_url(url));
        url_ok || self.video_id().is_some()
    }
}
