//! Core error types.

use std::fmt;

/// Errors raised when flushing accumulated output to a real HTTP response.
///
/// The accumulator itself never fails; only the conversion of emitted header
/// lines into a wire response can.
#[derive(Debug)]
pub enum Error {
    /// Header line without a `Name: value` shape, or with invalid bytes.
    InvalidHeader(String),

    /// Status code outside 100..=999.
    InvalidStatus(u16),

    /// I/O error.
    Io(std::io::Error),

    /// HTTP error.
    Http(http::Error),

    /// JSON encoding error.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHeader(line) => write!(f, "invalid header line: {}", line),
            Error::InvalidStatus(code) => write!(f, "invalid status code: {}", code),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
