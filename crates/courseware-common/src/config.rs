use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoursewareError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Settings shared by the editor adapter and the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API. Upload endpoints are resolved against it.
    pub api_base_url: String,
    /// Host that serves uploaded media. Defaults to `api_base_url`.
    pub media_base_url: Option<String>,
    /// Upload endpoint paths per media kind.
    pub upload: UploadEndpoints,
    /// Request timeout for uploads, in seconds.
    pub upload_timeout_secs: u64,
}

/// Upload endpoint paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadEndpoints {
    pub image: String,
    pub video: String,
    pub audio: String,
}

impl Default for UploadEndpoints {
    fn default() -> Self {
        Self {
            image: "api/upload/image".to_owned(),
            video: "api/upload/video".to_owned(),
            audio: "api/upload/audio".to_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            media_base_url: None,
            upload: UploadEndpoints::default(),
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// - `COURSEWARE_API_BASE_URL`
    /// - `COURSEWARE_MEDIA_BASE_URL`
    /// - `COURSEWARE_UPLOAD_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup("COURSEWARE_API_BASE_URL").filter(|s| !s.trim().is_empty()) {
            config.api_base_url = base;
        }
        config.media_base_url =
            lookup("COURSEWARE_MEDIA_BASE_URL").filter(|s| !s.trim().is_empty());
        if let Some(timeout) = lookup("COURSEWARE_UPLOAD_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => config.upload_timeout_secs = secs,
                Err(e) => tracing::warn!(
                    value = %timeout,
                    error = %e,
                    "invalid COURSEWARE_UPLOAD_TIMEOUT_SECS, using default"
                ),
            }
        }
        config
    }

    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, CoursewareError> {
        loader.load().await
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), CoursewareError> {
        saver.save(self).await
    }

    /// Host used to absolutize media URLs.
    pub fn media_base_url(&self) -> &str {
        self.media_base_url.as_deref().unwrap_or(&self.api_base_url)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            media_base_url: self.media_base_url().to_owned(),
        }
    }

    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            media_base_url: self.media_base_url().to_owned(),
            upload: self.upload.clone(),
        }
    }
}

/// Settings injected into the block renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Base that relative image/video/audio URLs are resolved against.
    pub media_base_url: String,
}

impl RenderConfig {
    pub fn new(media_base_url: impl Into<String>) -> Self {
        Self {
            media_base_url: media_base_url.into(),
        }
    }
}

/// Settings injected into the editor adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Base that server-relative upload URLs are rewritten against.
    pub media_base_url: String,
    pub upload: UploadEndpoints,
}

impl AdapterConfig {
    pub fn new(media_base_url: impl Into<String>) -> Self {
        Self {
            media_base_url: media_base_url.into(),
            upload: UploadEndpoints::default(),
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<Config, CoursewareError>> + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &Config) -> impl Future<Output = Result<(), CoursewareError>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`Config`] data is serialized according to the file extension,
    /// `.json` or `.toml`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn format(&self) -> Result<Format, CoursewareError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            _ => Err(CoursewareError::UnsupportedFormat(
                self.path.display().to_string(),
            )),
        }
    }
}

enum Format {
    Json,
    Toml,
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Config, CoursewareError> {
        let format = self.format()?;
        let contents = std::fs::read_to_string(&self.path)?;
        match format {
            Format::Json => Ok(serde_json::from_str(&contents)?),
            Format::Toml => Ok(toml::from_str(&contents)?),
        }
    }
}

impl Saver for FileStore {
    async fn save(&self, config: &Config) -> Result<(), CoursewareError> {
        let contents = match self.format()? {
            Format::Json => serde_json::to_string_pretty(config)?,
            Format::Toml => toml::to_string_pretty(config)?,
        };
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
