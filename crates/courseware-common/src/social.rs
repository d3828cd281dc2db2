//! Social embed helpers shared by the embed handlers and the renderer.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Platforms with a dedicated embed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Twitter,
    Facebook,
    YouTube,
}

impl SocialPlatform {
    /// Domain substrings a URL must contain to count as belonging to the platform.
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            SocialPlatform::Twitter => &["twitter.com", "x.com"],
            SocialPlatform::Facebook => &["facebook.com", "fb.com", "fb.watch"],
            SocialPlatform::YouTube => &["youtube.com", "youtu.be"],
        }
    }

    /// Advisory check: non-blank and contains one of the platform domains.
    pub fn matches_url(self, url: &str) -> bool {
        let url = url.trim();
        !url.is_empty() && self.domains().iter().any(|domain| url.contains(domain))
    }

    pub fn label(self) -> &'static str {
        match self {
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::YouTube => "YouTube",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SocialPlatform::Twitter => "Paste a tweet URL",
            SocialPlatform::Facebook => "Paste a Facebook post or video URL",
            SocialPlatform::YouTube => "Paste a YouTube video URL",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status URL shapes, tried in order. First match wins.
static TWEET_ID_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"twitter\.com/[^/]+/status/(\d+)").unwrap(),
        Regex::new(r"x\.com/[^/]+/status/(\d+)").unwrap(),
        Regex::new(r"twitter\.com/[^/]+/statuses/(\d+)").unwrap(),
        Regex::new(r"x\.com/[^/]+/statuses/(\d+)").unwrap(),
    ]
});

static YOUTUBE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{6,})",
    )
    .unwrap()
});

static YOUTUBE_ID_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").unwrap());

/// Extract the numeric status id from a tweet URL.
pub fn tweet_id(url: &str) -> Option<&str> {
    TWEET_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract the video id from a YouTube watch/short/embed URL.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    YOUTUBE_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Does a stored id have the shape of a YouTube video id?
pub fn is_youtube_video_id(id: &str) -> bool {
    YOUTUBE_ID_SHAPE_RE.is_match(id)
}

/// iframe source for a YouTube video id.
pub fn youtube_embed_src(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

/// iframe source for a post URL, or `None` if no frame can be built from it.
pub fn embed_src(platform: SocialPlatform, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match platform {
        SocialPlatform::Twitter => tweet_id(url)
            .map(|id| format!("https://platform.twitter.com/embed/Tweet.html?id={id}")),
        SocialPlatform::Facebook => {
            if !platform.matches_url(url) {
                return None;
            }
            let plugin = if url.contains("/videos/") || url.contains("fb.watch") || url.contains("/watch") {
                "video"
            } else {
                "post"
            };
            let encoded: String = ::url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
            Some(format!(
                "https://www.facebook.com/plugins/{plugin}.php?href={encoded}&show_text=true"
            ))
        }
        SocialPlatform::YouTube => youtube_video_id(url).map(youtube_embed_src),
    }
}
