//! Error types for sg-core

use thiserror::Error;

/// Core error type for schemagate
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Version cannot be encoded for storage
    #[error("[E004] Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// E005: Stored version does not use a known encoding
    #[error("[E005] invalid stored version {version:?}: {reason}")]
    InvalidStoredVersion { version: String, reason: String },

    /// E006: Rule payload does not match the rule kind
    #[error("[E006] Invalid payload for rule '{kind}': {message}")]
    InvalidPayload { kind: String, message: String },

    /// E007: Unknown enum value read from storage or user input
    #[error("[E007] Unknown {what} '{value}'")]
    UnknownValue { what: &'static str, value: String },

    /// E008: IO error
    #[error("[E008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E010: YAML parse error
    #[error("[E010] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
