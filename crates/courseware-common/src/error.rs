//! Error types shared by the courseware crates.

use miette::Diagnostic;

/// Main error type for configuration and document (de)serialization.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum CoursewareError {
    /// Unsupported configuration file format
    #[error("unsupported configuration format: {0}")]
    #[diagnostic(
        code(courseware::config::format),
        help("use a .json or .toml file")
    )]
    UnsupportedFormat(String),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(courseware::io))]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(courseware::serde::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(courseware::serde::toml_de))]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(courseware::serde::toml_ser))]
    TomlSer(#[from] toml::ser::Error),
}

impl From<serde_json::Error> for CoursewareError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(SerDeError::Json(err))
    }
}

impl From<toml::de::Error> for CoursewareError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serde(SerDeError::TomlDe(err))
    }
}

impl From<toml::ser::Error> for CoursewareError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serde(SerDeError::TomlSer(err))
    }
}
