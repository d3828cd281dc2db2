//! courseware-editor-core: block editor logic without UI framework dependencies.
//!
//! This crate provides:
//! - `EditorAdapter` - owns one editing session per anchor, emits the block
//!   document on every change and on teardown
//! - `SessionRegistry` - shared guard against two sessions on one anchor
//! - `BlockHandler` trait and the closed catalog of handlers (`ToolHandler`)
//! - `SurfaceHost` / `EditorSurface` - the editing surface abstraction
//! - `Uploader` trait and the reqwest-backed `HttpUploader`

pub mod adapter;
pub mod handler;
pub mod platform;
pub mod registry;
pub mod tools;
pub mod upload;

pub use adapter::{
    AdapterState, BlockEdit, ChangeCallback, CompletedUpload, EditorAdapter, MountConfig,
    MountOutcome, UploadTask,
};
pub use handler::{
    BlockHandler, BlockView, ComparisonView, EmbedView, FilePicker, ImageView, MediaView,
    MountFlag,
};
pub use platform::{EditorSurface, HeadlessHost, HeadlessSurface, SurfaceError, SurfaceHost};
pub use registry::SessionRegistry;
pub use smol_str::SmolStr;
pub use tools::{
    ComparisonData, ComparisonEdit, ComparisonTool, ImageTool, MediaTool, Side, SocialEmbedTool,
    TextTool, ToolHandler, ToolSpec, catalog,
};
pub use upload::{
    CredentialStore, HttpUploader, MediaKind, NoCredentials, StaticCredentials, UploadError,
    UploadFile, UploadRequest, UploadResponse, Uploader,
};
