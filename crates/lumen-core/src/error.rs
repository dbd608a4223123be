//! Error types for Lumen Core

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Controller error types
#[derive(Error, Debug)]
pub enum Error {
    // Source errors
    #[error("Failed to load source: {url}")]
    LoadError { url: String },

    #[error("No fallback quality available after failure of {url}")]
    NoFallbackAvailable { url: String },

    // Command errors
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unknown quality: {label}")]
    UnknownQuality { label: String },

    #[error("Unknown subtitle language: {language}")]
    UnknownSubtitle { language: String },

    // Playback errors
    #[error("Invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a load error for a source URL
    pub fn load(url: impl Into<String>) -> Self {
        Error::LoadError { url: url.into() }
    }

    /// Returns true if a quality fallback may recover from this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::LoadError { .. })
    }

    /// Returns the error code for host reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::LoadError { .. } => "LOAD_ERROR",
            Error::NoFallbackAvailable { .. } => "NO_FALLBACK",
            Error::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Error::UnknownQuality { .. } => "UNKNOWN_QUALITY",
            Error::UnknownSubtitle { .. } => "UNKNOWN_SUBTITLE",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
        }
    }
}
