//! Error types for template registry and configuration operations.
//!
//! Provides a unified error type covering I/O, serialization and template
//! validation failures.

use thiserror::Error;

/// Errors that can occur while loading, validating or looking up templates.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Template failed a fatal validation check (empty name, no columns).
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// No template is registered under the requested name.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// All configured registry sources failed.
    #[error("no template sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
