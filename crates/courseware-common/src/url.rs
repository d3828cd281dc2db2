//! URL helpers for media stored in block documents.
//!
//! Upload endpoints hand back either absolute URLs or server-relative paths
//! (`/uploads/x.png`). Stored documents can carry either as well.

/// Is this an absolute `http://` or `https://` URL?
pub fn is_http_url(url: &str) -> bool {
    match ::url::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Is this a server-relative path, i.e. starts with `/` but is not protocol-relative.
pub fn is_root_relative(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

/// Join a base URL and a path with exactly one `/` between them.
pub fn join_base(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        return format!("/{path}");
    }
    format!("{base}/{path}")
}

/// Rewrite a URL returned by the upload endpoint.
///
/// Server-relative paths are prefixed with `base`. Everything else, including
/// absolute and protocol-relative URLs, passes through unchanged.
pub fn absolutize_upload_url(base: &str, url: &str) -> String {
    if is_root_relative(url) && !base.is_empty() {
        join_base(base, url)
    } else {
        url.to_string()
    }
}

/// Resolve a media URL found in a stored document for display.
///
/// Absolute URLs (any scheme), protocol-relative URLs and `data:`/`blob:` URLs
/// are kept. Anything else is treated as a path on the media host.
/// Returns `None` for a blank URL.
pub fn resolve_media_url(base: &str, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("//") || has_scheme(url) || base.is_empty() {
        return Some(url.to_string());
    }
    Some(join_base(base, url))
}

fn has_scheme(url: &str) -> bool {
    ::url::Url::parse(url).is_ok()
}
