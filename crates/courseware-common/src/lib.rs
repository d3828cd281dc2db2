//! courseware-common: shared types for the course content editor and renderer.
//!
//! This crate provides:
//! - `BlockDocument` / `Block` / `BlockType` - the stored block document format
//! - URL helpers for resolving uploaded and relative media URLs
//! - Social embed helpers (tweet ids, YouTube ids, iframe sources)
//! - Configuration, error types and tracing setup

pub mod config;
pub mod document;
pub mod error;
pub mod social;
pub mod telemetry;
pub mod url;

pub use config::{AdapterConfig, Config, RenderConfig, UploadEndpoints};
pub use document::{Block, BlockDocument, BlockType};
pub use error::{CoursewareError, SerDeError};
pub use smol_str::SmolStr;
pub use social::SocialPlatform;
