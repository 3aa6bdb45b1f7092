//! Error types for webdocx library.

use std::io;
use thiserror::Error;

/// Result type alias for webdocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting pages or drafting reports.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level HTTP failure (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("Failed to fetch {url}: HTTP {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// No resource is available for the requested URL.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Error preparing the parsed HTML tree.
    #[error("HTML error: {0}")]
    Html(String),

    /// Image bytes could not be decoded.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// The image container format is not recognized.
    #[error("Unknown image format")]
    UnknownImageFormat,

    /// Error building or packing the DOCX archive.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Report template is malformed or a selection does not match it.
    #[error("Template error: {0}")]
    Template(String),

    /// Settings could not be read or written.
    #[error("Settings error: {0}")]
    Settings(String),

    /// A text-generation call was attempted without an API key.
    #[error("API Key is missing. Please check your settings.")]
    MissingCredential,

    /// The configured text-generation provider is not known.
    #[error("Invalid AI provider: {0}")]
    InvalidProvider(String),

    /// The text-generation service returned an error.
    #[error("{provider} error: {message}")]
    Provider {
        /// Provider name
        provider: &'static str,
        /// Message reported by the service
        message: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            },
            _ => Error::Http(err.to_string()),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON error: {}", err))
    }
}
