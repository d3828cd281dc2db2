use courseware_common::{Block, BlockType};
use regex::Regex;
use serde_json::json;

use super::*;

fn config() -> RenderConfig {
    RenderConfig::new("https://cdn.example.com")
}

fn lesson() -> Value {
    json!({
        "time": 1700000000000u64,
        "blocks": [
            {"type": "header", "data": {"text": "Welcome to <em>Week 1</em>", "level": 2}},
            {"type": "paragraph", "data": {"text": "Read <b>chapter one</b> first."}},
            {"type": "list", "data": {"style": "ordered", "items": ["Slides", "Lab"]}},
            {"type": "quote", "data": {"text": "Practice <i>daily</i>", "caption": "Coach <Kim>"}},
            {"type": "image", "data": {
                "file": {"url": "/uploads/map.png"},
                "caption": "Campus map",
                "withBorder": true
            }},
            {"type": "video", "data": {"url": "https://videos.example.org/intro.mp4", "name": "intro.mp4"}},
            {"type": "audio", "data": {"url": ""}},
            {"type": "youtube", "data": {"url": "https://youtu.be/dQw4w9WgXcQ", "videoId": "dQw4w9WgXcQ"}},
            {"type": "twitter", "data": {"url": "https://x.com/someuser/status/1234567890"}},
            {"type": "delimiter", "data": {}}
        ]
    })
}

#[test]
fn test_render_lesson() {
    let html = render_value(&lesson(), &config());
    insta::assert_snapshot!(html, @r#"
<h2>Welcome to <em>Week 1</em></h2>
<p>Read <b>chapter one</b> first.</p>
<ol><li>Slides</li><li>Lab</li></ol>
<blockquote><p>Practice <i>daily</i></p><cite>Coach &lt;Kim&gt;</cite></blockquote>
<figure class="block-image with-border"><img src="https://cdn.example.com/uploads/map.png" alt="Campus map" /><figcaption>Campus map</figcaption></figure>
<figure class="block-video"><video controls src="https://videos.example.org/intro.mp4"></video><figcaption>intro.mp4</figcaption></figure>
<div class="block-social block-youtube"><iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ" frameborder="0" allowfullscreen></iframe></div>
<div class="block-social block-twitter"><iframe src="https://platform.twitter.com/embed/Tweet.html?id=1234567890" frameborder="0" allowfullscreen></iframe></div>
<hr />
"#);
}

#[test]
fn test_render_remaining_types() {
    let blocks = json!([
        {"type": "list", "data": {"style": "unordered", "items": [
            {"content": "A", "items": [{"content": "A.1", "items": []}]},
            "B"
        ]}},
        {"type": "table", "data": {"withHeadings": true, "content": [
            ["Week", "Topic"],
            ["1", "Intro &amp; setup"]
        ]}},
        {"type": "comparison", "data": {
            "leftTitle": "Manual",
            "rightTitle": "Auto <fast>",
            "leftPoints": ["Slow", " "],
            "rightPoints": ["Fast"]
        }},
        {"type": "code", "data": {"code": "if a < b {}", "language": "rust"}},
        {"type": "link", "data": {
            "link": "https://docs.example.com/guide",
            "meta": {"title": "Guide", "description": "How & why"}
        }},
        {"type": "raw", "data": {"html": "<div class=\"note\">Hi</div>"}},
        {"type": "embed", "data": {
            "embed": "https://player.vimeo.com/video/1",
            "width": 580,
            "height": 320,
            "caption": "Demo"
        }},
        {"type": "facebook", "data": {"url": "https://example.com/p"}},
        {"type": "youtube", "data": {"url": "https://www.youtube.com/watch?v=abcdef123"}},
        {"type": "youtube", "data": {}}
    ]);
    let html = render_value(&blocks, &config());
    insta::assert_snapshot!(html, @r#"
<ul><li>A<ul><li>A.1</li></ul></li><li>B</li></ul>
<table><thead><tr><th>Week</th><th>Topic</th></tr></thead><tbody><tr><td>1</td><td>Intro &amp; setup</td></tr></tbody></table>
<div class="block-comparison"><div class="comparison-column comparison-left"><h4>Manual</h4><ul><li>Slow</li></ul></div><div class="comparison-column comparison-right"><h4>Auto &lt;fast&gt;</h4><ul><li>Fast</li></ul></div></div>
<pre><code class="language-rust">if a &lt; b {}</code></pre>
<a class="block-link" href="https://docs.example.com/guide" target="_blank" rel="noopener"><span class="block-link-title">Guide</span><span class="block-link-description">How &amp; why</span><span class="block-link-domain">docs.example.com</span></a>
<div class="note">Hi</div>
<figure class="block-embed"><iframe src="https://player.vimeo.com/video/1" width="580" height="320" frameborder="0" allowfullscreen></iframe><figcaption>Demo</figcaption></figure>
<div class="block-social block-facebook"><iframe src="https://example.com/p" frameborder="0" allowfullscreen></iframe></div>
<div class="block-social block-youtube"><iframe src="https://www.youtube.com/embed/abcdef123" frameborder="0" allowfullscreen></iframe></div>
"#);
}

#[test]
fn test_unknown_block_falls_back_to_dump() {
    let blocks = json!([{"type": "unknown_widget", "data": {"foo": 1}}]);
    let html = render_value(&blocks, &config());
    assert!(!html.is_empty());
    insta::assert_snapshot!(html, @r#"
<pre class="block-unknown"><code>{
  &quot;type&quot;: &quot;unknown_widget&quot;,
  &quot;data&quot;: {
    &quot;foo&quot;: 1
  }
}</code></pre>
"#);
}

#[test]
fn test_malformed_blocks_fall_back_in_place() {
    let blocks = json!([
        {"type": "paragraph", "data": {"text": "before"}},
        {"type": "paragraph", "data": {"text": 5}},
        {"type": "list", "data": {"items": "not a list"}},
        {"data": {"text": "no type"}},
        "just a string",
        {"type": "paragraph", "data": {"text": "after"}}
    ]);
    let html = render_value(&blocks, &config());
    let fragments: Vec<&str> = html
        .split_inclusive("</p>\n")
        .flat_map(|chunk| chunk.split_inclusive("</pre>\n"))
        .collect();
    assert_eq!(fragments.len(), 6);
    assert_eq!(fragments[0], "<p>before</p>\n");
    for dump in &fragments[1..5] {
        assert!(dump.starts_with("<pre class=\"block-unknown\">"), "{dump}");
    }
    assert!(fragments[4].contains("&quot;just a string&quot;"));
    assert_eq!(fragments[5], "<p>after</p>\n");
}

#[test]
fn test_media_without_url_is_skipped() {
    let blocks = json!([
        {"type": "image", "data": {"file": {"url": "  "}, "caption": "Nothing yet"}},
        {"type": "image", "data": {}},
        {"type": "video", "data": {"url": ""}},
        {"type": "audio", "data": {"name": "a.mp3"}},
        {"type": "twitter", "data": {"url": ""}},
        {"type": "facebook", "data": {}}
    ]);
    assert_eq!(render_value(&blocks, &config()), "");
}

#[test]
fn test_media_urls_round_trip() {
    let stored = [
        "https://cdn.example.com/uploads/img123.png",
        "https://other.com/x.png",
    ];
    let src_re = Regex::new(r#"src="([^"]+)""#).unwrap();
    for url in stored {
        let blocks = json!([
            {"type": "image", "data": {"file": {"url": url}, "caption": ""}},
            {"type": "video", "data": {"url": url}},
        ]);
        let html = render_value(&blocks, &config());
        let found: Vec<&str> = src_re
            .captures_iter(&html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec![url, url]);
    }

    let relative = json!([{"type": "audio", "data": {"url": "uploads/a.mp3"}}]);
    let html = render_value(&relative, &config());
    assert!(html.contains(r#"src="https://cdn.example.com/uploads/a.mp3""#));

    let youtube = json!([{"type": "youtube", "data": {"videoId": "dQw4w9WgXcQ"}}]);
    let html = render_value(&youtube, &config());
    let src = src_re.captures(&html).and_then(|caps| caps.get(1)).unwrap();
    assert_eq!(src.as_str(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
}

#[test]
fn test_rendering_is_idempotent() {
    let input = lesson();
    let config = config();
    assert_eq!(render_value(&input, &config), render_value(&input, &config));

    let text = input.to_string();
    assert_eq!(render_str(&text, &config), render_str(&text, &config));
    assert_eq!(render_str(&text, &config), render_value(&input, &config));
}

#[test]
fn test_input_normalization() {
    let config = config();
    let markup = "<p>Already <b>rendered</b> &amp; stored</p>";
    assert_eq!(render_str(markup, &config), markup);
    assert_eq!(render_value(&json!(markup), &config), markup);
    assert_eq!(render_str("42", &config), "42");

    let encoded = json!(json!({"blocks": [{"type": "delimiter"}]}).to_string());
    assert_eq!(render_value(&encoded, &config), "<hr />\n");
    assert_eq!(
        render_value(&json!({"type": "paragraph", "data": {"text": "lone"}}), &config),
        "<p>lone</p>\n"
    );

    assert_eq!(render_value(&json!({"title": "no blocks"}), &config), "");
    assert_eq!(render_value(&json!(null), &config), "");
    assert_eq!(render_value(&json!(3.5), &config), "");
    assert_eq!(render_str("{\"blocks\": 7}", &config), "");
}

#[test]
fn test_render_document() {
    let document = BlockDocument::from_blocks(vec![
        Block::new(BlockType::Header, json!({"text": "Quiz", "level": 9})).with_id("h1"),
        Block::new(BlockType::Paragraph, json!({"text": "Answer all questions."})),
    ]);
    assert_eq!(
        render_document(&document, &RenderConfig::default()),
        "<h6>Quiz</h6>\n<p>Answer all questions.</p>\n"
    );
}

#[test]
fn test_youtube_video_id_must_look_like_an_id() {
    let config = config();
    let bad = json!([{"type": "youtube", "data": {"videoId": "../x"}}]);
    assert_eq!(render_value(&bad, &config), "");

    let bad_with_url = json!([{"type": "youtube", "data": {
        "videoId": "x\"><script>",
        "url": "https://youtu.be/dQw4w9WgXcQ"
    }}]);
    assert_eq!(
        render_value(&bad_with_url, &config),
        "<div class=\"block-social block-youtube\"><iframe src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\" frameborder=\"0\" allowfullscreen></iframe></div>\n"
    );
}
