//! Error types for multisum.

use crate::types::Modality;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultisumError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Input routing errors
    #[error("Unsupported modality: {tag}")]
    UnsupportedModality { tag: String },

    // Extraction errors
    #[error("{modality} extraction failed: {message}")]
    ExtractionFailed { modality: Modality, message: String },

    #[error("No text to summarize from {modality} input")]
    NothingToSummarize { modality: Modality },

    // Model errors
    #[error("Model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Model error: {message}")]
    Model { message: String },

    // External tools (ffmpeg, ffprobe)
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a [`MultisumError`].
///
/// Callers that only care about why no summary was produced match on this
/// instead of the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedModality,
    ExtractionFailed,
    NothingToSummarize,
    ModelError,
    Config,
    Io,
    Other,
}

impl MultisumError {
    /// Shorthand for an extraction failure of the given modality.
    pub fn extraction(modality: Modality, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            modality,
            message: message.into(),
        }
    }

    /// Shorthand for a model load or inference failure.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigFileNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalidValue { .. }
            | Self::Config(_) => ErrorKind::Config,
            Self::UnsupportedModality { .. } => ErrorKind::UnsupportedModality,
            Self::ExtractionFailed { .. } | Self::ToolNotFound { .. } | Self::ToolFailed { .. } => {
                ErrorKind::ExtractionFailed
            }
            Self::NothingToSummarize { .. } => ErrorKind::NothingToSummarize,
            Self::ModelNotFound { .. } | Self::Model { .. } => ErrorKind::ModelError,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MultisumError>;
