use std::fmt::Write;

use courseware_common::social::{self, SocialPlatform};
use courseware_common::url::resolve_media_url;
use courseware_common::{BlockType, RenderConfig};
use pulldown_cmark_escape::escape_html;
use serde_json::Value;

/// Render blocks in order. Each block's fragment ends with a newline.
pub fn render_blocks(blocks: &[Value], config: &RenderConfig) -> String {
    let mut html = String::new();
    for block in blocks {
        html.push_str(&render_block(block, config));
    }
    html
}

/// Render one stored block.
///
/// Returns an empty string for media blocks without a source. Blocks of an
/// unknown type, or whose required fields are missing, render as a JSON dump.
pub fn render_block(block: &Value, config: &RenderConfig) -> String {
    let mut html = String::new();
    let Some(tag) = block.get("type").and_then(Value::as_str) else {
        tracing::debug!("block without a type, rendering raw");
        render_raw_dump(&mut html, block);
        return html;
    };
    let data = block.get("data").unwrap_or(&Value::Null);

    let rendered = match BlockType::from(tag) {
        BlockType::Paragraph => render_paragraph(&mut html, data),
        BlockType::Header => render_header(&mut html, data),
        BlockType::List => render_list(&mut html, data),
        BlockType::Quote => render_quote(&mut html, data),
        BlockType::Image => render_image(&mut html, data, config),
        BlockType::Video => render_video(&mut html, data, config),
        BlockType::Audio => render_audio(&mut html, data, config),
        BlockType::Table => render_table(&mut html, data),
        BlockType::Embed => render_embed(&mut html, data),
        BlockType::Link => render_link(&mut html, data),
        BlockType::Raw => render_raw_html(&mut html, data),
        BlockType::Code => render_code(&mut html, data),
        BlockType::Delimiter => {
            html.push_str("<hr />\n");
            Some(())
        }
        BlockType::Comparison => render_comparison(&mut html, data),
        BlockType::Twitter => render_social(&mut html, data, SocialPlatform::Twitter),
        BlockType::Facebook => render_social(&mut html, data, SocialPlatform::Facebook),
        BlockType::YouTube => render_youtube(&mut html, data),
        BlockType::Other(_) => None,
    };

    if rendered.is_none() {
        tracing::debug!(block_type = tag, "unrenderable block, rendering raw");
        html.clear();
        render_raw_dump(&mut html, block);
    }
    html
}

fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Non-blank string field.
fn text_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    str_field(data, key).filter(|s| !s.trim().is_empty())
}

fn render_raw_dump(html: &mut String, block: &Value) {
    let dump = serde_json::to_string_pretty(block).unwrap_or_default();
    html.push_str("<pre class=\"block-unknown\"><code>");
    let _ = escape_html(&mut *html, &dump);
    html.push_str("</code></pre>\n");
}

fn render_paragraph(html: &mut String, data: &Value) -> Option<()> {
    let text = str_field(data, "text")?;
    html.push_str("<p>");
    html.push_str(text);
    html.push_str("</p>\n");
    Some(())
}

fn render_header(html: &mut String, data: &Value) -> Option<()> {
    let text = str_field(data, "text")?;
    let level = data
        .get("level")
        .and_then(Value::as_u64)
        .unwrap_or(2)
        .clamp(1, 6);
    let _ = write!(html, "<h{}>", level);
    html.push_str(text);
    let _ = write!(html, "</h{}>\n", level);
    Some(())
}

fn render_list(html: &mut String, data: &Value) -> Option<()> {
    let items = data.get("items")?.as_array()?;
    let tag = match str_field(data, "style") {
        Some("ordered") => "ol",
        _ => "ul",
    };
    render_list_items(html, tag, items);
    html.push('\n');
    Some(())
}

/// Items are plain strings, or `{ content, items }` for nested lists.
fn render_list_items(html: &mut String, tag: &str, items: &[Value]) {
    let _ = write!(html, "<{}>", tag);
    for item in items {
        match item {
            Value::String(text) => {
                html.push_str("<li>");
                html.push_str(text);
                html.push_str("</li>");
            }
            Value::Object(_) => {
                html.push_str("<li>");
                html.push_str(str_field(item, "content").unwrap_or_default());
                if let Some(children) = item.get("items").and_then(Value::as_array)
                    && !children.is_empty()
                {
                    render_list_items(html, tag, children);
                }
                html.push_str("</li>");
            }
            _ => {}
        }
    }
    let _ = write!(html, "</{}>", tag);
}

fn render_quote(html: &mut String, data: &Value) -> Option<()> {
    let text = str_field(data, "text")?;
    html.push_str("<blockquote><p>");
    html.push_str(text);
    html.push_str("</p>");
    if let Some(caption) = text_field(data, "caption") {
        html.push_str("<cite>");
        let _ = escape_html(&mut *html, caption);
        html.push_str("</cite>");
    }
    html.push_str("</blockquote>\n");
    Some(())
}

/// `data.file.url`, falling back to `data.url`, resolved for display.
fn media_src(data: &Value, config: &RenderConfig) -> Option<String> {
    let url = data
        .pointer("/file/url")
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .or_else(|| str_field(data, "url"))?;
    resolve_media_url(&config.media_base_url, url)
}

fn render_image(html: &mut String, data: &Value, config: &RenderConfig) -> Option<()> {
    let Some(src) = media_src(data, config) else {
        return Some(());
    };
    let caption = text_field(data, "caption");
    let flag = |key: &str| data.get(key).and_then(Value::as_bool).unwrap_or(false);

    html.push_str("<figure class=\"block-image");
    if flag("withBorder") {
        html.push_str(" with-border");
    }
    if flag("stretched") {
        html.push_str(" stretched");
    }
    if flag("withBackground") {
        html.push_str(" with-background");
    }
    html.push_str("\"><img src=\"");
    let _ = escape_html(&mut *html, &src);
    html.push_str("\" alt=\"");
    let _ = escape_html(&mut *html, caption.unwrap_or_default());
    html.push_str("\" />");
    if let Some(caption) = caption {
        html.push_str("<figcaption>");
        let _ = escape_html(&mut *html, caption);
        html.push_str("</figcaption>");
    }
    html.push_str("</figure>\n");
    Some(())
}

fn render_video(html: &mut String, data: &Value, config: &RenderConfig) -> Option<()> {
    render_player(html, data, config, "video")
}

fn render_audio(html: &mut String, data: &Value, config: &RenderConfig) -> Option<()> {
    render_player(html, data, config, "audio")
}

fn render_player(html: &mut String, data: &Value, config: &RenderConfig, tag: &str) -> Option<()> {
    let Some(src) = media_src(data, config) else {
        return Some(());
    };
    let _ = write!(html, "<figure class=\"block-{}\"><{} controls src=\"", tag, tag);
    let _ = escape_html(&mut *html, &src);
    let _ = write!(html, "\"></{}>", tag);
    if let Some(name) = text_field(data, "name") {
        html.push_str("<figcaption>");
        let _ = escape_html(&mut *html, name);
        html.push_str("</figcaption>");
    }
    html.push_str("</figure>\n");
    Some(())
}

fn render_table(html: &mut String, data: &Value) -> Option<()> {
    let rows = data.get("content")?.as_array()?;
    let rows: Vec<&Vec<Value>> = rows.iter().map(Value::as_array).collect::<Option<_>>()?;
    let with_headings = data
        .get("withHeadings")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    html.push_str("<table>");
    let mut body = rows.as_slice();
    if with_headings && let Some((head, rest)) = rows.split_first() {
        html.push_str("<thead>");
        render_table_row(html, head, "th");
        html.push_str("</thead>");
        body = rest;
    }
    html.push_str("<tbody>");
    for row in body {
        render_table_row(html, row, "td");
    }
    html.push_str("</tbody></table>\n");
    Some(())
}

fn render_table_row(html: &mut String, cells: &[Value], tag: &str) {
    html.push_str("<tr>");
    for cell in cells {
        let _ = write!(html, "<{}>", tag);
        match cell {
            Value::String(text) => html.push_str(text),
            Value::Null => {}
            other => {
                let _ = write!(html, "{}", other);
            }
        }
        let _ = write!(html, "</{}>", tag);
    }
    html.push_str("</tr>");
}

fn render_code(html: &mut String, data: &Value) -> Option<()> {
    let code = str_field(data, "code")?;
    html.push_str("<pre><code");
    if let Some(lang) = text_field(data, "language").or_else(|| text_field(data, "lang")) {
        html.push_str(" class=\"language-");
        let _ = escape_html(&mut *html, lang);
        html.push('"');
    }
    html.push('>');
    let _ = escape_html(&mut *html, code);
    html.push_str("</code></pre>\n");
    Some(())
}

fn render_raw_html(html: &mut String, data: &Value) -> Option<()> {
    let raw = str_field(data, "html")?;
    html.push_str(raw);
    html.push('\n');
    Some(())
}

fn render_embed(html: &mut String, data: &Value) -> Option<()> {
    let src = text_field(data, "embed")?;
    html.push_str("<figure class=\"block-embed\"><iframe src=\"");
    let _ = escape_html(&mut *html, src);
    html.push('"');
    for key in ["width", "height"] {
        if let Some(size) = data.get(key).and_then(Value::as_u64) {
            let _ = write!(html, " {}=\"{}\"", key, size);
        }
    }
    html.push_str(" frameborder=\"0\" allowfullscreen></iframe>");
    if let Some(caption) = text_field(data, "caption") {
        html.push_str("<figcaption>");
        let _ = escape_html(&mut *html, caption);
        html.push_str("</figcaption>");
    }
    html.push_str("</figure>\n");
    Some(())
}

fn render_link(html: &mut String, data: &Value) -> Option<()> {
    let link = text_field(data, "link")?;
    let meta = data.get("meta").unwrap_or(&Value::Null);

    html.push_str("<a class=\"block-link\" href=\"");
    let _ = escape_html(&mut *html, link);
    html.push_str("\" target=\"_blank\" rel=\"noopener\">");
    html.push_str("<span class=\"block-link-title\">");
    let _ = escape_html(&mut *html, text_field(meta, "title").unwrap_or(link));
    html.push_str("</span>");
    if let Some(description) = text_field(meta, "description") {
        html.push_str("<span class=\"block-link-description\">");
        let _ = escape_html(&mut *html, description);
        html.push_str("</span>");
    }
    html.push_str("<span class=\"block-link-domain\">");
    let _ = escape_html(&mut *html, extract_domain(link));
    html.push_str("</span></a>\n");
    Some(())
}

fn render_comparison(html: &mut String, data: &Value) -> Option<()> {
    data.as_object()?;
    html.push_str("<div class=\"block-comparison\">");
    render_comparison_column(html, data, "left");
    render_comparison_column(html, data, "right");
    html.push_str("</div>\n");
    Some(())
}

fn render_comparison_column(html: &mut String, data: &Value, side: &str) {
    let title = str_field(data, &format!("{side}Title")).unwrap_or_default();
    let points = data
        .get(format!("{side}Points").as_str())
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let _ = write!(html, "<div class=\"comparison-column comparison-{}\"><h4>", side);
    let _ = escape_html(&mut *html, title);
    html.push_str("</h4><ul>");
    for point in points.iter().filter_map(Value::as_str) {
        let point = point.trim();
        if point.is_empty() {
            continue;
        }
        html.push_str("<li>");
        let _ = escape_html(&mut *html, point);
        html.push_str("</li>");
    }
    html.push_str("</ul></div>");
}

fn render_social(html: &mut String, data: &Value, platform: SocialPlatform) -> Option<()> {
    let Some(url) = text_field(data, "url").map(str::trim) else {
        return Some(());
    };
    let src = social::embed_src(platform, url).unwrap_or_else(|| url.to_string());
    render_embed_frame(html, &platform.label().to_lowercase(), &src);
    Some(())
}

fn render_youtube(html: &mut String, data: &Value) -> Option<()> {
    let video_id = text_field(data, "videoId")
        .map(str::trim)
        .filter(|id| social::is_youtube_video_id(id))
        .or_else(|| str_field(data, "url").and_then(social::youtube_video_id));
    if let Some(id) = video_id {
        render_embed_frame(html, "youtube", &social::youtube_embed_src(id));
    }
    Some(())
}

fn render_embed_frame(html: &mut String, platform: &str, src: &str) {
    let _ = write!(html, "<div class=\"block-social block-{}\"><iframe src=\"", platform);
    let _ = escape_html(&mut *html, src);
    html.push_str("\" frameborder=\"0\" allowfullscreen></iframe></div>\n");
}

fn extract_domain(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .and_then(|s| s.split('/').next())
        .unwrap_or(url)
}
