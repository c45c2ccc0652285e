//! Error types for the card service

use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving card requests
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to encode a payload into a QR symbol
    #[error("QR encoding failed: {0}")]
    EncodeError(String),

    /// Failed to render or save the output image
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to load or fill a page template
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to bind, read, or write on the HTTP side
    #[error("Server error: {0}")]
    ServerError(String),
}
