// src/error.rs

//! Unified error handling for the gallery grabber.

use std::fmt;

use thiserror::Error;

/// Result type alias for grabber operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Gallery page yielded zero viewer links
    #[error("No viewer links found for gallery {gallery_url}")]
    NoViewerLinksFound { gallery_url: String },

    /// Archive requested for an empty URL list
    #[error("No images to download")]
    NoImagesToDownload,

    /// Unknown job id
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// HTTP request to the origin site failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Archive writing failed
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a no-viewer-links error for a gallery.
    pub fn no_viewer_links(gallery_url: impl Into<String>) -> Self {
        Self::NoViewerLinksFound {
            gallery_url: gallery_url.into(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl fmt::Display) -> Self {
        Self::Internal(message.to_string())
    }

    /// Whether this error means "nothing there" rather than "something broke".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoViewerLinksFound { .. } | Self::NoImagesToDownload | Self::JobNotFound(_)
        )
    }
}
