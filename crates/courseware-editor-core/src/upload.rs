//! Media upload for image, video and audio blocks.
//!
//! Handlers never see transport errors: every failure is logged and turned
//! into a `{ "success": 0 }` response, which leaves the block untouched.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use courseware_common::url::{is_http_url, join_base};
use courseware_common::{BlockType, Config, UploadEndpoints};
use miette::Diagnostic;
use mime_sniffer::MimeTypeSniffer;
use serde::{Deserialize, Deserializer, Serialize};

/// Which kind of media a block uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Multipart field name the endpoint expects.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    pub fn accept(self) -> &'static str {
        match self {
            MediaKind::Image => "image/*",
            MediaKind::Video => "video/*",
            MediaKind::Audio => "audio/*",
        }
    }

    pub fn block_type(self) -> BlockType {
        match self {
            MediaKind::Image => BlockType::Image,
            MediaKind::Video => BlockType::Video,
            MediaKind::Audio => BlockType::Audio,
        }
    }

    pub fn endpoint(self, endpoints: &UploadEndpoints) -> &str {
        match self {
            MediaKind::Image => &endpoints.image,
            MediaKind::Video => &endpoints.video,
            MediaKind::Audio => &endpoints.audio,
        }
    }
}

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create an upload, sniffing the MIME type from the bytes.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let mime_type = bytes
            .sniff_mime_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            name: name.into(),
            mime_type,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// One upload call: what to send and where.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub kind: MediaKind,
    /// Endpoint path (relative to the API base) or absolute URL
    pub endpoint: String,
    pub file: UploadFile,
}

/// Response body of the upload endpoint.
///
/// Image endpoints answer with `file.url`, video endpoints with
/// `data.url`/`data.path`. Both shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "deserialize_success")]
    pub success: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<UploadedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<UploadedData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuccessFlag {
    Int(i64),
    Bool(bool),
    Text(String),
}

fn deserialize_success<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let flag = Option::<SuccessFlag>::deserialize(deserializer)?;
    Ok(match flag {
        Some(SuccessFlag::Int(n)) => u8::from(n != 0),
        Some(SuccessFlag::Bool(b)) => u8::from(b),
        Some(SuccessFlag::Text(s)) => u8::from(matches!(s.trim(), "1" | "true")),
        None => 0,
    })
}

impl UploadResponse {
    pub fn failed() -> Self {
        Self::default()
    }

    /// Successful image-style response carrying `file.url`.
    pub fn with_file_url(url: impl Into<String>) -> Self {
        Self {
            success: 1,
            file: Some(UploadedFile {
                url: Some(url.into()),
            }),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success == 1
    }

    /// The uploaded file's URL, from whichever shape the endpoint used.
    pub fn url(&self) -> Option<&str> {
        let from_file = self.file.as_ref().and_then(|f| f.url.as_deref());
        let from_data = self
            .data
            .as_ref()
            .and_then(|d| d.url.as_deref().or(d.path.as_deref()));
        from_file
            .or(from_data)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.filename.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    /// The URL of a successful upload, or why there is none.
    pub fn into_url(self) -> Result<String, UploadError> {
        if !self.is_success() {
            return Err(UploadError::Rejected);
        }
        self.url().map(str::to_owned).ok_or(UploadError::MissingUrl)
    }
}

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    #[diagnostic(code(courseware::upload::transport))]
    Transport(#[from] reqwest::Error),

    #[error("upload endpoint responded with status {0}")]
    #[diagnostic(code(courseware::upload::status))]
    Status(u16),

    #[error("malformed upload response: {0}")]
    #[diagnostic(code(courseware::upload::malformed))]
    Malformed(#[from] serde_json::Error),

    #[error("upload was rejected by the server")]
    #[diagnostic(code(courseware::upload::rejected))]
    Rejected,

    #[error("upload response did not include a file url")]
    #[diagnostic(code(courseware::upload::missing_url))]
    MissingUrl,
}

/// Sends a picked file to the upload endpoint.
///
/// Implementations must not fail: errors become `UploadResponse::failed()`.
pub trait Uploader: Send + Sync {
    fn upload_by_file(
        &self,
        request: UploadRequest,
    ) -> impl Future<Output = UploadResponse> + Send;
}

/// Source of the caller's API credentials.
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
}

/// No credentials; requests go out unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
    fn access_token(&self) -> Option<String> {
        None
    }

    fn refresh_token(&self) -> Option<String> {
        None
    }
}

/// Fixed tokens, e.g. read once from the session at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl CredentialStore for StaticCredentials {
    fn access_token(&self) -> Option<String> {
        self.access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.refresh.clone()
    }
}

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Multipart uploader over reqwest.
pub struct HttpUploader<C = NoCredentials> {
    client: reqwest::Client,
    api_base_url: String,
    credentials: C,
}

impl HttpUploader<NoCredentials> {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        Self::with_timeout(config.api_base_url.clone(), config.upload_timeout())
    }

    pub fn with_timeout(
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base_url: api_base_url.into(),
            credentials: NoCredentials,
        })
    }
}

impl<C: CredentialStore> HttpUploader<C> {
    pub fn with_credentials<C2: CredentialStore>(self, credentials: C2) -> HttpUploader<C2> {
        HttpUploader {
            client: self.client,
            api_base_url: self.api_base_url,
            credentials,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        if is_http_url(endpoint) {
            endpoint.to_owned()
        } else {
            join_base(&self.api_base_url, endpoint)
        }
    }

    async fn send(&self, request: UploadRequest) -> Result<UploadResponse, UploadError> {
        let UploadRequest {
            kind,
            endpoint,
            file,
        } = request;
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name)
            .mime_str(&file.mime_type)?;
        let form = reqwest::multipart::Form::new().part(kind.field_name(), part);

        let mut builder = self.client.post(self.endpoint_url(&endpoint)).multipart(form);
        if let Some(token) = self.credentials.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(refresh) = self.credentials.refresh_token() {
            builder = builder.header(REFRESH_TOKEN_HEADER, refresh);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl<C: CredentialStore> Uploader for HttpUploader<C> {
    async fn upload_by_file(&self, request: UploadRequest) -> UploadResponse {
        let kind = request.kind;
        match self.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(kind = kind.field_name(), error = %e, "media upload failed");
                UploadResponse::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::Multipart;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
        let field = multipart.next_field().await.unwrap().unwrap();
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().replace('/', "-");
        let len = field.bytes().await.unwrap().len();
        Json(json!({
            "success": 1,
            "file": { "url": format!("/uploads/{field_name}/{content_type}/{len}/{file_name}") },
        }))
    }

    async fn whoami(headers: HeaderMap) -> Json<Value> {
        let header = |name: &str, missing: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(missing)
                .to_string()
        };
        let url = format!(
            "{}|{}",
            header("authorization", "anonymous"),
            header(REFRESH_TOKEN_HEADER, "-")
        );
        Json(json!({ "success": 1, "file": { "url": url } }))
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/api/upload/image", post(echo_upload))
            .route("/api/upload/video", post(|| async {
                Json(json!({ "success": true, "data": { "path": "/media/v.mp4", "filename": "v.mp4" } }))
            }))
            .route("/api/upload/whoami", post(whoami))
            .route("/api/upload/broken", post(|| async { "not json" }))
            .route("/api/upload/error", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request(kind: MediaKind, endpoint: &str) -> UploadRequest {
        UploadRequest {
            kind,
            endpoint: endpoint.to_string(),
            file: UploadFile::new("cat.png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        }
    }

    #[test]
    fn test_response_shapes() {
        let image: UploadResponse =
            serde_json::from_str(r#"{"success":1,"file":{"url":"/uploads/a.png"}}"#).unwrap();
        assert!(image.is_success());
        assert_eq!(image.url(), Some("/uploads/a.png"));

        let video: UploadResponse = serde_json::from_str(
            r#"{"success":true,"data":{"path":"/media/v.mp4","filename":"v.mp4"}}"#,
        )
        .unwrap();
        assert!(video.is_success());
        assert_eq!(video.url(), Some("/media/v.mp4"));
        assert_eq!(video.file_name(), Some("v.mp4"));

        let prefer_url: UploadResponse = serde_json::from_str(
            r#"{"success":1,"data":{"url":"https://cdn.example.com/v.mp4","path":"/media/v.mp4"}}"#,
        )
        .unwrap();
        assert_eq!(prefer_url.url(), Some("https://cdn.example.com/v.mp4"));

        let failed: UploadResponse = serde_json::from_str(r#"{"success":0}"#).unwrap();
        assert!(!failed.is_success());
        assert!(matches!(failed.into_url(), Err(UploadError::Rejected)));

        let missing: UploadResponse = serde_json::from_str(r#"{"success":1}"#).unwrap();
        assert!(matches!(missing.into_url(), Err(UploadError::MissingUrl)));

        let no_flag: UploadResponse = serde_json::from_str(r#"{"file":{"url":"/a"}}"#).unwrap();
        assert!(!no_flag.is_success());
    }

    #[test]
    fn test_upload_file_sniffs_mime_type() {
        let file = UploadFile::new("cat.png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(file.mime_type, "image/png");
        let file = UploadFile::new("notes.bin", vec![0u8, 1, 2]).with_mime_type("audio/mpeg");
        assert_eq!(file.mime_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_http_upload_sends_multipart() {
        let base = spawn_server().await;
        let uploader = HttpUploader::with_timeout(base, Duration::from_secs(5))
            .unwrap()
            .with_credentials(StaticCredentials {
                access: Some("access-123".into()),
                refresh: Some("refresh-456".into()),
            });

        let response = uploader
            .send(request(MediaKind::Image, "api/upload/image"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(response.url(), Some("/uploads/image/image-png/8/cat.png"));
    }

    #[tokio::test]
    async fn test_http_upload_sends_credential_headers() {
        let base = spawn_server().await;
        let anonymous = HttpUploader::with_timeout(base.clone(), Duration::from_secs(5)).unwrap();
        let response = anonymous
            .upload_by_file(request(MediaKind::Image, "api/upload/whoami"))
            .await;
        assert_eq!(response.url(), Some("anonymous|-"));

        let signed_in = anonymous.with_credentials(StaticCredentials {
            access: Some("tok".into()),
            refresh: Some("ref".into()),
        });
        let response = signed_in
            .upload_by_file(request(MediaKind::Image, "api/upload/whoami"))
            .await;
        assert_eq!(response.url(), Some("Bearer tok|ref"));
    }

    #[tokio::test]
    async fn test_http_upload_degrades_to_failure() {
        let base = spawn_server().await;
        let uploader = HttpUploader::with_timeout(base.clone(), Duration::from_secs(5)).unwrap();

        let video = uploader
            .upload_by_file(request(MediaKind::Video, "api/upload/video"))
            .await;
        assert_eq!(video.url(), Some("/media/v.mp4"));

        for endpoint in ["api/upload/broken", "api/upload/error", "api/upload/missing"] {
            let response = uploader
                .upload_by_file(request(MediaKind::Image, endpoint))
                .await;
            assert_eq!(response, UploadResponse::failed(), "{endpoint}");
        }

        let unreachable =
            HttpUploader::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let response = unreachable
            .upload_by_file(request(MediaKind::Image, "api/upload/image"))
            .await;
        assert!(!response.is_success());
    }

    #[test]
    fn test_endpoint_url() {
        let uploader =
            HttpUploader::with_timeout("https://api.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            uploader.endpoint_url("/api/upload/image"),
            "https://api.example.com/api/upload/image"
        );
        assert_eq!(
            uploader.endpoint_url("https://files.example.com/up"),
            "https://files.example.com/up"
        );
    }
}
